//! Build events reported by the driver script on stdout.

use serde::{Deserialize, Serialize};

/// Prefix of a stdout line carrying an event.
pub const EVENT_MARKER: &str = "@@funcpack ";

/// One finished compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEvent {
    pub success: bool,
    /// Bundler diagnostics; empty for successful builds.
    #[serde(default)]
    pub diagnostics: String,
}

#[derive(Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum DriverEvent {
    Build(BuildEvent),
}

/// Parses a stdout line. Returns `None` for ordinary bundler output.
pub fn parse_event(line: &str) -> Option<serde_json::Result<BuildEvent>> {
    let payload = line.strip_prefix(EVENT_MARKER)?;
    Some(serde_json::from_str::<DriverEvent>(payload).map(|DriverEvent::Build(event)| event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_plain_output() {
        assert!(parse_event("asset index.js 1.2 KiB [emitted]").is_none());
    }

    #[test]
    fn parses_build_events() {
        let event = parse_event(r#"@@funcpack {"event":"build","success":false,"diagnostics":"ERROR in ./a.js"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            BuildEvent {
                success: false,
                diagnostics: "ERROR in ./a.js".into(),
            }
        );

        let ok = parse_event(r#"@@funcpack {"event":"build","success":true}"#)
            .unwrap()
            .unwrap();
        assert!(ok.success);
        assert!(ok.diagnostics.is_empty());
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(parse_event("@@funcpack {").unwrap().is_err());
        assert!(parse_event(r#"@@funcpack {"event":"other"}"#).unwrap().is_err());
    }
}
