//! Application services for task CRUD and aggregated views.

mod aggregation;

pub use aggregation::{
    CreateTaskRequest, TaskPage, TaskService, TaskServiceError, TaskServiceResult,
};
