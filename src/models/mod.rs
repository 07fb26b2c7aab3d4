pub mod pagination;
pub mod project;
pub mod subtask;
pub mod task;
pub mod user;

pub use pagination::{ListQuery, Pagination};
pub use project::{MemberInput, Project, ProjectInput, ProjectWithMembers};
pub use subtask::{Subtask, SubtaskFilter, SubtaskInput, SubtaskUpdate};
pub use task::{Task, TaskFilter, TaskInput, TaskStatus, TaskUpdate};
pub use user::{Role, User, UserUpdate};
