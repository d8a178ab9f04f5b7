//! Demonstration of a Store driving a small todo list UI

use watchbox::{create_store, Store};

#[derive(Clone, Debug)]
struct TodoItem {
    id: usize,
    title: String,
    completed: bool,
}

#[derive(Clone, Debug)]
struct AppState {
    todos: Vec<TodoItem>,
    filter: TodoFilter,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TodoFilter {
    All,
    Active,
    Completed,
}

impl AppState {
    fn new() -> Self {
        Self {
            todos: Vec::new(),
            filter: TodoFilter::All,
        }
    }

    fn add_todo(&mut self, title: &str) {
        let id = self.todos.len();
        self.todos.push(TodoItem {
            id,
            title: title.to_string(),
            completed: false,
        });
    }

    fn toggle_todo(&mut self, id: usize) {
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.completed = !todo.completed;
        }
    }

    fn filtered_todos(&self) -> Vec<&TodoItem> {
        match self.filter {
            TodoFilter::All => self.todos.iter().collect(),
            TodoFilter::Active => self.todos.iter().filter(|t| !t.completed).collect(),
            TodoFilter::Completed => self.todos.iter().filter(|t| t.completed).collect(),
        }
    }

    fn stats(&self) -> (usize, usize, usize) {
        let total = self.todos.len();
        let completed = self.todos.iter().filter(|t| t.completed).count();
        (total, total - completed, completed)
    }
}

fn render_list(state: &AppState) {
    for todo in state.filtered_todos() {
        let status = if todo.completed { "x" } else { " " };
        println!("   [{}] {}", status, todo.title);
    }
}

fn main() {
    println!("=== Store Example: Todo App ===\n");

    let store: Store<AppState> = create_store(AppState::new());

    // The status bar renders once on subscribe, then on every change.
    println!("1. Mounting status bar");
    let status_bar = store.subscribe(|state: &AppState| {
        let (total, active, completed) = state.stats();
        println!("   [status] total: {total}, active: {active}, completed: {completed}");
    });

    // The list view only lives while its guard does.
    println!("\n2. Mounting list view");
    let list_view = store.subscribe_guarded(|state: &AppState| {
        println!("   [list] filter = {:?}", state.filter);
        render_list(state);
    });

    println!("\n3. Adding todos");
    for title in ["Learn Rust", "Build a store", "Write documentation"] {
        store.modify(|state| state.add_todo(title));
    }

    println!("\n4. Completing first todo");
    store.modify(|state| state.toggle_todo(0));

    println!("\n5. Filtering to active todos");
    store.update(|state| AppState {
        filter: TodoFilter::Active,
        ..state.clone()
    });

    println!("\n6. Unmounting list view");
    drop(list_view);
    store.modify(|state| state.toggle_todo(1));

    println!("\n7. Unmounting status bar");
    status_bar.unsubscribe();
    store.modify(|state| state.filter = TodoFilter::Completed);

    let (total, active, completed) = store.read(|state| state.stats());
    println!("\n8. Final statistics (store version {})", store.version());
    println!("   Total: {total}");
    println!("   Active: {active}");
    println!("   Completed: {completed}");
}
