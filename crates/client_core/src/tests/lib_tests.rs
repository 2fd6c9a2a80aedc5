use super::*;
use anyhow::anyhow;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    ListSummaries,
    CreateList(String),
    DeleteList(ListId),
    GetList(ListId),
    CreateItem(ListId, String),
    DeleteItem(ListId, ItemId),
    SetChecked(ListId, ItemId, bool),
}

/// In-memory stand-in for the REST API that records every call.
#[derive(Default)]
struct FakeApi {
    lists: Mutex<Vec<ToDoList>>,
    calls: Mutex<Vec<Call>>,
    fail_with: Mutex<Option<String>>,
    next_id: Mutex<u32>,
}

impl FakeApi {
    fn with_lists(names: &[&str]) -> Arc<Self> {
        let api = Arc::new(Self::default());
        {
            let mut lists = api.lists.lock().expect("lists");
            for name in names {
                lists.push(ToDoList {
                    id: ListId(format!("id-{name}")),
                    name: name.to_string(),
                    items: Vec::new(),
                });
            }
        }
        api
    }

    fn fail(&self, message: &str) {
        *self.fail_with.lock().expect("fail") = Some(message.to_string());
    }

    fn recover(&self) {
        *self.fail_with.lock().expect("fail") = None;
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls").clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().expect("calls").push(call);
        match self.fail_with.lock().expect("fail").as_ref() {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().expect("next id");
        *next += 1;
        format!("{prefix}-{next}")
    }

    fn update_list(
        &self,
        list_id: &ListId,
        update: impl FnOnce(&mut ToDoList),
    ) -> Result<ToDoList> {
        let mut lists = self.lists.lock().expect("lists");
        let list = lists
            .iter_mut()
            .find(|list| &list.id == list_id)
            .ok_or_else(|| anyhow!("HTTP 404: todo list {list_id} not found"))?;
        update(list);
        Ok(list.clone())
    }
}

#[async_trait]
impl ListsApi for FakeApi {
    async fn list_summaries(&self) -> Result<Vec<ListSummary>> {
        self.record(Call::ListSummaries)?;
        Ok(self
            .lists
            .lock()
            .expect("lists")
            .iter()
            .map(ToDoList::summary)
            .collect())
    }

    async fn create_list(&self, name: &str) -> Result<NewListResponse> {
        self.record(Call::CreateList(name.to_string()))?;
        let id = ListId(self.fresh_id("list"));
        self.lists.lock().expect("lists").push(ToDoList {
            id: id.clone(),
            name: name.to_string(),
            items: Vec::new(),
        });
        Ok(NewListResponse {
            id,
            name: name.to_string(),
        })
    }

    async fn delete_list(&self, list_id: &ListId) -> Result<bool> {
        self.record(Call::DeleteList(list_id.clone()))?;
        let mut lists = self.lists.lock().expect("lists");
        let before = lists.len();
        lists.retain(|list| &list.id != list_id);
        Ok(lists.len() != before)
    }

    async fn get_list(&self, list_id: &ListId) -> Result<ToDoList> {
        self.record(Call::GetList(list_id.clone()))?;
        self.update_list(list_id, |_| {})
    }

    async fn create_item(&self, list_id: &ListId, label: &str) -> Result<ToDoList> {
        self.record(Call::CreateItem(list_id.clone(), label.to_string()))?;
        let item_id = ItemId(self.fresh_id("item"));
        self.update_list(list_id, |list| {
            list.items.push(shared::domain::ToDoItem {
                id: item_id,
                label: label.to_string(),
                checked: false,
            })
        })
    }

    async fn delete_item(&self, list_id: &ListId, item_id: &ItemId) -> Result<ToDoList> {
        self.record(Call::DeleteItem(list_id.clone(), item_id.clone()))?;
        self.update_list(list_id, |list| list.items.retain(|item| &item.id != item_id))
    }

    async fn set_checked_state(
        &self,
        list_id: &ListId,
        item_id: &ItemId,
        checked: bool,
    ) -> Result<ToDoList> {
        self.record(Call::SetChecked(list_id.clone(), item_id.clone(), checked))?;
        self.update_list(list_id, |list| {
            if let Some(item) = list.items.iter_mut().find(|item| &item.id == item_id) {
                item.checked = checked;
            }
        })
    }
}

fn app_with(api: &Arc<FakeApi>) -> TodoApp {
    TodoApp::new(api.clone())
}

#[tokio::test]
async fn starts_loading_until_first_fetch() {
    let api = FakeApi::with_lists(&["chores"]);
    let mut app = app_with(&api);
    assert_eq!(app.view(), AppView::Loading);
    assert!(api.calls().is_empty());

    app.reload_data().await;
    let AppView::Overview(summaries) = app.view() else {
        panic!("expected overview");
    };
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "chores");
}

#[tokio::test]
async fn failed_fetch_falls_back_to_empty_list() {
    let api = FakeApi::with_lists(&["chores", "work"]);
    let mut app = app_with(&api);
    app.reload_data().await;
    assert_eq!(app.list_summaries().map(<[_]>::len), Some(2));

    api.fail("connection refused");
    app.reload_data().await;
    assert_eq!(app.view(), AppView::Overview(&[]));
}

#[tokio::test]
async fn create_posts_then_refetches() {
    let api = FakeApi::with_lists(&[]);
    let mut app = app_with(&api);

    app.create_list("groceries").await;

    assert_eq!(
        api.calls(),
        vec![Call::CreateList("groceries".to_string()), Call::ListSummaries]
    );
    let summaries = app.list_summaries().expect("loaded");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "groceries");
}

#[tokio::test]
async fn failed_create_skips_refetch_and_keeps_state() {
    let api = FakeApi::with_lists(&["chores"]);
    let mut app = app_with(&api);
    app.reload_data().await;

    api.fail("HTTP 500");
    app.create_list("groceries").await;

    assert_eq!(
        api.calls(),
        vec![
            Call::ListSummaries,
            Call::CreateList("groceries".to_string())
        ]
    );
    assert_eq!(app.list_summaries().map(<[_]>::len), Some(1));
}

#[tokio::test]
async fn delete_then_refetches() {
    let api = FakeApi::with_lists(&["chores", "work"]);
    let mut app = app_with(&api);
    app.reload_data().await;

    let target = ListId::from("id-chores");
    app.delete_list(&target).await;

    assert_eq!(
        api.calls(),
        vec![
            Call::ListSummaries,
            Call::DeleteList(target),
            Call::ListSummaries
        ]
    );
    let summaries = app.list_summaries().expect("loaded");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "work");
}

#[tokio::test]
async fn select_is_local_and_back_refetches() {
    let api = FakeApi::with_lists(&["chores"]);
    let mut app = app_with(&api);
    app.reload_data().await;

    let list_id = ListId::from("id-chores");
    app.select_list(list_id.clone());
    assert_eq!(api.calls(), vec![Call::ListSummaries]);
    assert_eq!(
        app.view(),
        AppView::Detail {
            list_id: &list_id,
            list: None
        }
    );

    app.back_to_list().await;
    assert!(app.selected().is_none());
    assert!(app.detail().is_none());
    assert_eq!(api.calls(), vec![Call::ListSummaries, Call::ListSummaries]);
    assert!(matches!(app.view(), AppView::Overview(_)));
}

#[tokio::test]
async fn detail_operations_replace_detail_with_response() {
    let api = FakeApi::with_lists(&["chores"]);
    let mut app = app_with(&api);
    let list_id = ListId::from("id-chores");
    app.select_list(list_id.clone());
    app.load_selected().await;
    assert!(app.detail().expect("detail").items.is_empty());

    app.add_item("dishes").await;
    let item_id = app.detail().expect("detail").items[0].id.clone();

    app.set_checked(&item_id, true).await;
    assert!(app.detail().expect("detail").items[0].checked);

    app.delete_item(&item_id).await;
    assert!(app.detail().expect("detail").items.is_empty());

    assert_eq!(
        api.calls(),
        vec![
            Call::GetList(list_id.clone()),
            Call::CreateItem(list_id.clone(), "dishes".to_string()),
            Call::SetChecked(list_id.clone(), item_id.clone(), true),
            Call::DeleteItem(list_id, item_id),
        ]
    );
}

#[tokio::test]
async fn failed_detail_update_keeps_previous_detail() {
    let api = FakeApi::with_lists(&["chores"]);
    let mut app = app_with(&api);
    app.select_list(ListId::from("id-chores"));
    app.load_selected().await;
    app.add_item("dishes").await;
    let before = app.detail().cloned();

    api.fail("HTTP 503");
    app.add_item("laundry").await;
    assert_eq!(app.detail().cloned(), before);

    app.load_selected().await;
    assert!(app.detail().is_none());

    api.recover();
    app.load_selected().await;
    assert_eq!(app.detail().map(|list| list.items.len()), Some(1));
}

#[tokio::test]
async fn detail_operations_without_selection_issue_no_requests() {
    let api = FakeApi::with_lists(&["chores"]);
    let mut app = app_with(&api);

    app.load_selected().await;
    app.add_item("dishes").await;
    app.delete_item(&ItemId::from("x")).await;
    app.set_checked(&ItemId::from("x"), true).await;

    assert!(api.calls().is_empty());
    assert_eq!(app.view(), AppView::Loading);
}

#[tokio::test]
async fn reselecting_another_list_drops_stale_detail() {
    let api = FakeApi::with_lists(&["chores", "work"]);
    let mut app = app_with(&api);
    app.select_list(ListId::from("id-chores"));
    app.load_selected().await;
    assert!(app.detail().is_some());

    app.select_list(ListId::from("id-work"));
    assert!(app.detail().is_none());

    app.select_list(ListId::from("id-work"));
    app.load_selected().await;
    app.select_list(ListId::from("id-work"));
    assert_eq!(app.detail().map(|list| list.name.as_str()), Some("work"));
}

#[test]
fn snapshot_owns_the_current_view() {
    let api = FakeApi::with_lists(&[]);
    let mut app = app_with(&api);
    assert_eq!(app.snapshot(), AppSnapshot::Loading);

    app.select_list(ListId::from("abc"));
    assert_eq!(
        app.snapshot(),
        AppSnapshot::Detail {
            list_id: ListId::from("abc"),
            list: None
        }
    );
}
