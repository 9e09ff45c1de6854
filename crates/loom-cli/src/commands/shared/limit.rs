/// Resolve the effective limit from the global flag and a default.
pub fn effective_limit(global: Option<u32>, default: u32) -> u32 {
    global.unwrap_or(default).max(1)
}
