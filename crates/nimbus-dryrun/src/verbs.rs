use std::collections::HashMap;

use http::Method;

/// Verb → human label lookup used when recording a suppressed call.
///
/// Passed to the dry-run transport explicitly; nothing here is global.
#[derive(Debug, Clone)]
pub struct VerbTable {
    labels: HashMap<Method, String>,
}

impl VerbTable {
    pub fn new(labels: HashMap<Method, String>) -> Self {
        Self { labels }
    }

    /// Label for `method`, or `execute <METHOD>` for verbs the table does
    /// not know.
    pub fn label(&self, method: &Method) -> String {
        self.labels
            .get(method)
            .cloned()
            .unwrap_or_else(|| format!("execute {method}"))
    }
}

impl Default for VerbTable {
    fn default() -> Self {
        let labels = [
            (Method::POST, "create"),
            (Method::PUT, "update"),
            (Method::PATCH, "update"),
            (Method::DELETE, "delete"),
        ]
        .into_iter()
        .map(|(method, verb)| {
            let label = format!("{verb} ({method})");
            (method, label)
        })
        .collect();
        Self { labels }
    }
}
