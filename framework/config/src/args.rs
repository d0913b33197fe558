use std::fmt::Display;

/// Turns a role-specific configuration into the argument vector passed verbatim to iperf3.
pub trait ToArgs {
    fn to_args(&self) -> Result<Vec<String>, ArgsError>;
}

/// An error type for [`ToArgs::to_args`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("client configuration has no server address")]
    MissingServerAddress,
}

/// Append `key value` when the value is set.
pub(crate) fn push_key_val<V: Display>(args: &mut Vec<String>, key: &str, value: Option<V>) {
    if let Some(value) = value {
        args.push(key.to_string());
        args.push(value.to_string());
    }
}

/// Append `key` when the flag is set.
pub(crate) fn push_key(args: &mut Vec<String>, key: &str, flag: bool) {
    if flag {
        args.push(key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_values_are_skipped() {
        let mut args = Vec::new();
        push_key_val::<u16>(&mut args, "--port", None);
        push_key(&mut args, "--debug", false);
        assert!(args.is_empty());
    }

    #[test]
    fn set_values_are_appended_in_order() {
        let mut args = Vec::new();
        push_key_val(&mut args, "--port", Some(5201u16));
        push_key(&mut args, "--debug", true);
        push_key_val(&mut args, "--interval", Some(0.5f32));
        assert_eq!(args, ["--port", "5201", "--debug", "--interval", "0.5"]);
    }
}
