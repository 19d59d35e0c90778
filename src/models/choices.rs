//! Closed sets of values stored as snake_case text columns.

macro_rules! text_choice {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal, default = $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize, ::utoipa::ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::errors::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::errors::AppError::validation(format!(
                        "unknown {}: {:?}",
                        $label, other
                    ))),
                }
            }
        }
    };
}

text_choice! {
    /// Progress state of a task.
    TaskStatus, "task status", default = Pending {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        OnHold => "on_hold",
    }
}

text_choice! {
    TaskPriority, "task priority", default = Medium {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

text_choice! {
    CaseStatus, "case status", default = Open {
        Open => "open",
        InProgress => "in_progress",
        Settled => "settled",
        Closed => "closed",
    }
}

text_choice! {
    CaseType, "case type", default = Other {
        Civil => "civil",
        Criminal => "criminal",
        Family => "family",
        Corporate => "corporate",
        Other => "other",
    }
}

text_choice! {
    /// Classification of an uploaded document.
    DocumentType, "document type", default = Other {
        CaseDocument => "case_document",
        ClientCommunication => "client_communication",
        LegalResearch => "legal_research",
        Correspondence => "correspondence",
        TaskDocument => "task_document",
        Other => "other",
    }
}

text_choice! {
    EventType, "event type", default = Other {
        Meeting => "meeting",
        CourtAppearance => "court_appearance",
        Deadline => "deadline",
        Personal => "personal",
        Other => "other",
    }
}

impl EventType {
    /// Colour used by calendar feeds.
    pub fn color(&self) -> &'static str {
        match self {
            EventType::Meeting => "#3788d8",
            EventType::CourtAppearance => "#d83737",
            EventType::Deadline => "#ffc107",
            EventType::Personal => "#6f42c1",
            EventType::Other => "#6c757d",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn parses_stored_text() {
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("urgent".parse::<TaskPriority>().unwrap(), TaskPriority::Urgent);
        assert_eq!("case_document".parse::<DocumentType>().unwrap(), DocumentType::CaseDocument);
        assert_eq!(" settled ".parse::<CaseStatus>().unwrap(), CaseStatus::Settled);
    }

    #[test]
    fn unknown_text_is_a_validation_error() {
        let err = "archived".parse::<CaseStatus>().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("case status"));
    }

    #[test]
    fn as_str_matches_serde_names() {
        for status in TaskStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json.as_str(), Some(status.as_str()));
        }
        for kind in EventType::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json.as_str(), Some(kind.as_str()));
        }
    }

    #[test]
    fn defaults_follow_the_schema() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(CaseStatus::default(), CaseStatus::Open);
        assert_eq!(CaseType::default(), CaseType::Other);
        assert_eq!(EventType::default(), EventType::Other);
    }

    #[test]
    fn every_event_type_has_its_own_colour() {
        let colours: std::collections::HashSet<_> = EventType::ALL.iter().map(|t| t.color()).collect();
        assert_eq!(colours.len(), EventType::ALL.len());
        assert_eq!(EventType::CourtAppearance.color(), "#d83737");
    }
}
