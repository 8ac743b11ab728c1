use std::fmt;

use crate::models::TaskId;

const BASE: &str = "/example";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    TaskList,
    TaskDetail { id: String },
    About,
}

impl Route {
    pub fn task(id: &TaskId) -> Self {
        Route::TaskDetail { id: id.to_string() }
    }

    pub fn path(&self) -> String {
        match self {
            Route::TaskList => BASE.to_string(),
            Route::TaskDetail { id } => format!("{}/tasks/{}", BASE, urlencoding::encode(id)),
            Route::About => format!("{}/about", BASE),
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.strip_prefix(BASE)?;
        let rest = rest.trim_end_matches('/');
        match rest {
            "" => Some(Route::TaskList),
            "/about" => Some(Route::About),
            _ => {
                let raw = rest.strip_prefix("/tasks/")?;
                if raw.is_empty() || raw.contains('/') {
                    return None;
                }
                let id = urlencoding::decode(raw).ok()?;
                Some(Route::TaskDetail { id: id.into_owned() })
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Navigation history. The bottom entry is never popped.
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Navigator {
            stack: vec![Route::TaskList],
        }
    }
}

impl Navigator {
    pub fn current(&self) -> &Route {
        // stack is never empty
        &self.stack[self.stack.len() - 1]
    }

    pub fn push(&mut self, route: Route) {
        log::debug!("navigate to {}", route);
        self.stack.push(route);
    }

    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }
}
