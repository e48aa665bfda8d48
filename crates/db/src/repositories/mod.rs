//! Database repositories.

mod catalog;
mod comment;
mod favorite;
mod ledger;
mod message;
mod order;
mod posting;
mod report;
mod review;
mod stats;
mod user;

pub use catalog::CatalogRepository;
pub use comment::CommentRepository;
pub use favorite::FavoriteRepository;
pub use ledger::LedgerRepository;
pub use message::MessageRepository;
pub use order::OrderRepository;
pub use posting::{PostingRepository, PostingSearchFilter};
pub use report::ReportRepository;
pub use review::ReviewRepository;
pub use stats::{PlatformStats, StatsRepository, TransTypeBreakdown, UserStats};
pub use user::UserRepository;
