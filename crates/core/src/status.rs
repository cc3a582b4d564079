//! Status and category vocabularies.
//!
//! Each enum maps to a `TEXT` column guarded by a `CHECK` constraint in the
//! migrations. The string values here must match those constraints exactly.

use std::fmt;

use crate::error::CoreError;

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($entity:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [&'static str] = &[$($val),+];

            /// Return the stored column value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $val ),+
                }
            }

            /// Parse from the stored column value.
            pub fn from_name(name: &str) -> Result<Self, CoreError> {
                match name {
                    $( $val => Ok(Self::$variant), )+
                    other => Err(CoreError::Internal(format!(
                        "Unknown {} '{other}'", $entity
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_text_enum! {
    /// Project lifecycle status.
    ProjectStatus ("project status") {
        Active = "active",
        Completed = "completed",
        OnHold = "on_hold",
    }
}

define_text_enum! {
    /// Kanban column of a task.
    TaskStatus ("task status") {
        Todo = "todo",
        InProgress = "in_progress",
        Done = "done",
    }
}

define_text_enum! {
    /// Schedule entry status.
    ScheduleStatus ("schedule status") {
        Scheduled = "scheduled",
        InProgress = "in_progress",
        Completed = "completed",
    }
}

define_text_enum! {
    /// Document category.
    DocumentCategory ("document category") {
        Plan = "plan",
        Contract = "contract",
        Report = "report",
        Photo = "photo",
        Other = "other",
    }
}

define_text_enum! {
    /// Contract lifecycle status.
    ContractStatus ("contract status") {
        Draft = "draft",
        Active = "active",
        Completed = "completed",
        Terminated = "terminated",
    }
}

define_text_enum! {
    /// Report type.
    ReportType ("report type") {
        Progress = "progress",
        Financial = "financial",
        Task = "task",
        Custom = "custom",
    }
}

impl ReportType {
    /// Report types whose content can be built from store state.
    pub const GENERATABLE: &'static [&'static str] = &["progress", "financial", "task"];
}
