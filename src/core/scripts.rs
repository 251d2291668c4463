use crate::core::events::GlobalScope;
use crate::domain::ports::{Document, ScriptExecutor};

/// Runs every script that arrived with the new content, once, in document
/// order.
///
/// Markup assignment leaves script elements inert, so each one is replaced by
/// a fresh copy carrying the same attributes and text, and the copy is handed
/// to the executor. A failing script is logged and the rest still run.
/// Returns the number of scripts started.
pub fn rerun_scripts<D, E>(document: &mut D, executor: &E, scope: &GlobalScope) -> usize
where
    D: Document + ?Sized,
    E: ScriptExecutor + ?Sized,
{
    let slots = document.inert_scripts();
    let mut started = 0;

    for slot in slots {
        let fresh = slot.script;
        document.substitute_script(slot.node, &fresh);

        match executor.execute(&fresh, scope) {
            Ok(()) => {
                tracing::debug!("Executed script {}", fresh.describe());
            }
            Err(e) => {
                tracing::warn!("Script {} failed: {}", fresh.describe(), e);
            }
        }
        started += 1;
    }

    started
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::dom::{HeadlessDocument, ShellOptions};
    use crate::domain::model::ScriptElement;
    use crate::utils::error::{Result, RouterError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<ScriptElement>>,
    }

    impl ScriptExecutor for Recorder {
        fn execute(&self, script: &ScriptElement, _scope: &GlobalScope) -> Result<()> {
            self.seen.lock().unwrap().push(script.clone());
            if script.text.contains("throw") {
                return Err(RouterError::ScriptError {
                    source_hint: script.describe(),
                    message: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    fn document_with(content: &str) -> HeadlessDocument {
        let mut doc = HeadlessDocument::parse(
            r#"<html><head></head><body><main id="main-content"></main></body></html>"#,
            ShellOptions::default(),
        );
        doc.replace_content(content);
        doc
    }

    #[test]
    fn test_runs_in_document_order_with_attributes() {
        let mut doc = document_with(
            r#"<script type="module" src="/static/js/orders.js" data-page="orders"></script>
<div><script>first();</script></div><script>second();</script>"#,
        );
        let recorder = Recorder::default();
        let scope = GlobalScope::new("page-loaded");

        assert_eq!(rerun_scripts(&mut doc, &recorder, &scope), 3);

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(
            seen[0].attributes,
            vec![
                ("type".to_string(), "module".to_string()),
                ("src".to_string(), "/static/js/orders.js".to_string()),
                ("data-page".to_string(), "orders".to_string()),
            ]
        );
        assert_eq!(seen[1].text, "first();");
        assert_eq!(seen[2].text, "second();");
    }

    #[test]
    fn test_scripts_run_only_once() {
        let mut doc = document_with("<script>once();</script>");
        let recorder = Recorder::default();
        let scope = GlobalScope::new("page-loaded");

        assert_eq!(rerun_scripts(&mut doc, &recorder, &scope), 1);
        assert_eq!(rerun_scripts(&mut doc, &recorder, &scope), 0);
        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failing_script_does_not_stop_the_rest() {
        let mut doc = document_with("<script>throw 1;</script><script>after();</script>");
        let recorder = Recorder::default();
        let scope = GlobalScope::new("page-loaded");

        assert_eq!(rerun_scripts(&mut doc, &recorder, &scope), 2);
        assert_eq!(recorder.seen.lock().unwrap()[1].text, "after();");
    }
}
