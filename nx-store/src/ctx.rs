/// Caller context handed to every store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ctx {
    Anonymous,
    Refresh { refresh_id: u64 },
}
