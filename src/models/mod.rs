pub mod favorite;
pub mod follow;
pub mod like;
pub mod post;
pub mod user;

pub use favorite::Entity as Favorite;
pub use follow::Entity as Follow;
pub use like::Entity as Like;
pub use post::{Entity as Post, Model as PostModel};
pub use user::{Entity as User, Model as UserModel};
