/// Words a server may not be registered under.
pub const RESERVED_NAMES: [&str; 15] = [
    "add", "list", "tool", "help", "execute", "delete", "remove", "update", "refresh", "sync",
    "status", "info", "version", "config", "settings",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|reserved| reserved.eq_ignore_ascii_case(name))
}
