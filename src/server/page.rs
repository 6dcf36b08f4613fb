// Landing page: the cached image plus a small client-side todo list.

use crate::config::MAX_TODO_LENGTH;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Welcome</title>
    <style>
      .todo-container {
        margin: 20px 0;
      }
      .todo-item {
        margin: 5px 0;
        padding: 5px;
        border-bottom: 1px solid #ccc;
      }
    </style>
  </head>
  <body>
    <h1>Welcome to the Todo Server</h1>
    <img src="/image" alt="Random Picture" style="max-width: 100%;">

    <div class="todo-container">
      <form id="todoForm" onsubmit="return submitTodo(event)">
        <input type="text" id="todoInput" maxlength="{{MAX_LEN}}" placeholder="Enter your todo (max {{MAX_LEN}} chars)" required>
        <button type="submit">Create Todo</button>
      </form>

      <h2>Existing Todos:</h2>
      <div id="todoList" class="todo-list"></div>
    </div>

    <script>
      function loadTodos() {
        fetch('/todos')
          .then(response => response.json())
          .then(todos => {
            const todoList = document.getElementById('todoList');
            todoList.replaceChildren(...todos.map(todo => {
              const item = document.createElement('div');
              item.className = 'todo-item';
              item.textContent = todo.text;
              return item;
            }));
          })
          .catch(error => console.error('Error loading todos:', error));
      }

      function submitTodo(event) {
        event.preventDefault();
        const input = document.getElementById('todoInput');
        const text = input.value.trim();

        if (text) {
          fetch('/todos', {
            method: 'POST',
            headers: {'Content-Type': 'application/json'},
            body: JSON.stringify({text})
          })
          .then(() => {
            input.value = '';
            loadTodos();
          })
          .catch(error => console.error('Error creating todo:', error));
        }
        return false;
      }

      loadTodos();
    </script>
  </body>
</html>
"#;

pub fn render_index() -> String {
    PAGE_TEMPLATE.replace("{{MAX_LEN}}", &MAX_TODO_LENGTH.to_string())
}
