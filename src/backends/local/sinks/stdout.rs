// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::Write;

use async_trait::async_trait;

use crate::errors::ProcessingError;
use crate::message::Item;
use crate::traits::Sink;

/// Prints each item as one line of JSON on standard output.
#[derive(Debug, Default)]
pub struct StdoutSink {
    pretty: bool,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn render(&self, item: &Item) -> Result<String, ProcessingError> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(item)
        } else {
            serde_json::to_string(item)
        };
        rendered.map_err(|e| ProcessingError::data_format(e.to_string()))
    }
}

#[async_trait]
impl Sink for StdoutSink {
    async fn deliver(&self, items: Vec<Item>) -> Result<Option<Item>, ProcessingError> {
        let lines = items
            .iter()
            .map(|item| self.render(item))
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = std::io::stdout().lock();
        for line in lines {
            writeln!(out, "{line}").map_err(|e| ProcessingError::connection(e.to_string()))?;
        }
        out.flush().map_err(|e| ProcessingError::connection(e.to_string()))?;
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_compact_and_pretty() {
        let item = json!({"a": 1});

        assert_eq!(StdoutSink::new().render(&item).unwrap(), r#"{"a":1}"#);
        assert_eq!(StdoutSink::pretty().render(&item).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[tokio::test]
    async fn test_deliver_has_no_reply() {
        assert_eq!(StdoutSink::new().deliver(vec![json!("x")]).await.unwrap(), None);
    }
}
