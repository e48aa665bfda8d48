//! Database entities.

pub mod category;
pub mod comment;
pub mod course;
pub mod favorite_post;
pub mod message;
pub mod order;
pub mod posting;
pub mod posting_image;
pub mod report;
pub mod review;
pub mod transaction_record;
pub mod user;

pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use course::Entity as Course;
pub use favorite_post::Entity as FavoritePost;
pub use message::Entity as Message;
pub use order::Entity as Order;
pub use posting::Entity as Posting;
pub use posting_image::Entity as PostingImage;
pub use report::Entity as Report;
pub use review::Entity as Review;
pub use transaction_record::Entity as TransactionRecord;
pub use user::Entity as User;
