//! Network OS selection.

use log::debug;

use crate::task::{Facts, TaskArgs};

/// Key carrying the network OS name in task arguments and facts.
pub const NETWORK_OS_KEY: &str = "network_os";

/// Choose the effective network OS for a task.
///
/// A non-empty explicit task argument beats a non-empty cached fact.
/// With neither, the OS is unknown and live discovery downstream has
/// to populate it; selection itself never talks to the device.
pub fn select(args: &TaskArgs, facts: &Facts) -> Option<String> {
    if let Some(os) = args.get_str(NETWORK_OS_KEY).filter(|os| !os.is_empty()) {
        debug!("network OS '{os}' from task argument");
        return Some(os.to_string());
    }

    if let Some(os) = facts.network_os() {
        debug!("network OS '{os}' from cached fact");
        return Some(os.to_string());
    }

    debug!("network OS unknown, deferring to discovery");
    None
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn facts_with(os: &str) -> Facts {
        let mut facts = Facts::new();
        facts.set(NETWORK_OS_KEY, json!(os));
        facts
    }

    #[test]
    fn test_argument_beats_fact() {
        let args = TaskArgs::new().with_arg(NETWORK_OS_KEY, json!("ios"));
        assert_eq!(select(&args, &facts_with("eos")).as_deref(), Some("ios"));
    }

    #[test]
    fn test_fact_used_without_argument() {
        assert_eq!(
            select(&TaskArgs::new(), &facts_with("junos")).as_deref(),
            Some("junos")
        );
    }

    #[test]
    fn test_empty_argument_falls_through() {
        let args = TaskArgs::new().with_arg(NETWORK_OS_KEY, json!(""));
        assert_eq!(select(&args, &facts_with("nxos")).as_deref(), Some("nxos"));
    }

    #[test]
    fn test_non_string_argument_falls_through() {
        let args = TaskArgs::new().with_arg(NETWORK_OS_KEY, json!(42));
        assert_eq!(select(&args, &Facts::new()), None);
    }

    #[test]
    fn test_unknown_without_sources() {
        assert_eq!(select(&TaskArgs::new(), &Facts::new()), None);
    }
}
