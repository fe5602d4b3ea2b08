//! The client side of the expense ledger: the remote ledger contract, the session's
//! projection of it, and the engine that keeps the two in sync.

mod entry;
mod http;
mod input;
mod memory;
mod projection;
mod remote;
mod status;
mod sync;
mod view;

pub use entry::{ExpenseEntry, Position, date_from_epoch, epoch_from_date};
pub use http::{DEFAULT_REQUEST_TIMEOUT, HttpLedgerClient};
pub use input::{Amount, ExpenseDraft, ExpenseForm, ValidationError, format_date, parse_date};
pub use memory::InMemoryLedger;
pub use projection::LedgerProjection;
pub use remote::{AccountId, RemoteEntry, RemoteError, RemoteLedger};
pub use status::{EditTarget, Operation, OperationStatus};
pub use sync::{SessionSnapshot, SyncEngine};
pub use view::{CategoryAggregate, DerivedView, SortKey, category_aggregate, sorted_view};
