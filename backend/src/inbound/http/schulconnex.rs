//! Translation of service errors into SchulConnex error payloads.
//!
//! Every [`DomainErrorKind`] maps through a fixed table to a
//! `{statusCode, subcode, title, description}` tuple. Attribute failures
//! are keyed by their reason and name the offending field path. Storage
//! failures collapse to a generic server error; their messages are never
//! serialised.

use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::PersistenceError;
use crate::domain::rules::Violation;
use crate::domain::{AttributeReason, DomainError, DomainErrorKind, ServiceError};

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchulConnexError {
    #[schema(example = 404)]
    pub status_code: u16,
    #[schema(example = "01")]
    pub subcode: String,
    #[schema(example = "Angefragte Entität existiert nicht")]
    pub title: String,
    pub description: String,
}

impl SchulConnexError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Generic 400 for requests rejected before reaching a service.
    pub fn bad_request(description: impl Into<String>) -> Self {
        Self::from_entry(&BAD_REQUEST, description.into())
    }

    fn from_entry(entry: &Entry, description: String) -> Self {
        Self {
            status_code: entry.status,
            subcode: entry.subcode.to_owned(),
            title: entry.title.to_owned(),
            description,
        }
    }
}

struct Entry {
    status: u16,
    subcode: &'static str,
    title: &'static str,
    description: &'static str,
}

const BAD_REQUEST: Entry = Entry {
    status: 400,
    subcode: "00",
    title: "Fehlerhafte Anfrage",
    description: "Die Anfrage ist fehlerhaft.",
};

const NOT_FOUND: Entry = Entry {
    status: 404,
    subcode: "01",
    title: "Angefragte Entität existiert nicht",
    description: "Die angeforderte Entität existiert nicht.",
};

const ALREADY_EXISTS: Entry = Entry {
    status: 400,
    subcode: "00",
    title: "Fehlerhafte Anfrage",
    description: "Die Entität existiert bereits.",
};

const COULD_NOT_BE_CREATED: Entry = Entry {
    status: 500,
    subcode: "00",
    title: "Interner Serverfehler",
    description: "Es ist ein interner Fehler aufgetreten. Die Entität konnte nicht erstellt werden.",
};

const COULD_NOT_BE_UPDATED: Entry = Entry {
    status: 500,
    subcode: "00",
    title: "Interner Serverfehler",
    description: "Es ist ein interner Fehler aufgetreten. Die Entität konnte nicht aktualisiert werden.",
};

const COULD_NOT_BE_DELETED: Entry = Entry {
    status: 500,
    subcode: "00",
    title: "Interner Serverfehler",
    description: "Es ist ein interner Fehler aufgetreten. Die Entität konnte nicht gelöscht werden.",
};

const MISMATCHED_REVISION: Entry = Entry {
    status: 409,
    subcode: "00",
    title: "Konflikt mit dem aktuellen Zustand der Resource",
    description: "Die Entität wurde eventuell durch Dritte verändert. Die Revisionsnummer stimmt nicht überein.",
};

const SPECIFICATION_VIOLATED: Entry = Entry {
    status: 400,
    subcode: "00",
    title: "Fehlerhafte Anfrage",
    description: "Die Anfrage verletzt eine fachliche Regel.",
};

const ATTRIBUTE_MISSING: Entry = Entry {
    status: 400,
    subcode: "02",
    title: "Pflichtattribut fehlt",
    description: "Ein Pflichtattribut fehlt",
};

const ATTRIBUTE_INVALID_LENGTH: Entry = Entry {
    status: 400,
    subcode: "07",
    title: "Attributwerte haben eine ungültige Länge",
    description: "Die Länge des Attributs ist ungültig",
};

const ATTRIBUTE_INVALID_CHARACTERS: Entry = Entry {
    status: 400,
    subcode: "11",
    title: "Text entspricht nicht dem Zeichensatz",
    description: "Das Attribut enthält unzulässige Zeichen",
};

const ATTRIBUTE_INVALID_UUID: Entry = Entry {
    status: 400,
    subcode: "08",
    title: "Ungültige Kennung",
    description: "Das Attribut ist keine gültige UUID",
};

const ATTRIBUTE_INVALID_VALUE: Entry = Entry {
    status: 400,
    subcode: "03",
    title: "Ungültiger Attributwert",
    description: "Der Wert des Attributs ist ungültig",
};

const INTERNAL: Entry = Entry {
    status: 500,
    subcode: "00",
    title: "Interner Serverfehler",
    description: "Es ist ein interner Fehler aufgetreten.",
};

const UNAVAILABLE: Entry = Entry {
    status: 503,
    subcode: "00",
    title: "Dienst nicht verfügbar",
    description: "Der Dienst ist vorübergehend nicht verfügbar.",
};

const fn attribute_entry(reason: AttributeReason) -> &'static Entry {
    match reason {
        AttributeReason::Missing => &ATTRIBUTE_MISSING,
        AttributeReason::InvalidLength => &ATTRIBUTE_INVALID_LENGTH,
        AttributeReason::InvalidCharacters => &ATTRIBUTE_INVALID_CHARACTERS,
        AttributeReason::InvalidUuid => &ATTRIBUTE_INVALID_UUID,
        AttributeReason::InvalidValue => &ATTRIBUTE_INVALID_VALUE,
    }
}

const fn violation_description(violation: Violation) -> &'static str {
    match violation {
        Violation::ClassNameRequired => "Eine Klasse muss einen Namen haben.",
        Violation::ClassAdministeredBySchool => {
            "Eine Klasse muss von einer Schule administriert werden."
        }
        Violation::ClassNameUniqueAtSchool => {
            "Der Name der Klasse ist an dieser Schule bereits vergeben."
        }
        Violation::SameRoleAtParentSchool => {
            "Die Rolle muss auch an der administrierenden Schule zugeordnet sein."
        }
        Violation::OnlyLearnersAndTeachersAtClass => {
            "An einer Klasse sind nur Lernende und Lehrende zulässig."
        }
        Violation::RoleAssignableAtOrganisation => {
            "Die Rolle kann an dieser Organisation nicht vergeben werden."
        }
        Violation::ExpectedAssignmentCount => {
            "Die Anzahl der Personenkontexte hat sich zwischenzeitlich geändert."
        }
    }
}

impl From<&DomainError> for SchulConnexError {
    fn from(error: &DomainError) -> Self {
        match error.kind() {
            DomainErrorKind::NotFound => Self::from_entry(
                &NOT_FOUND,
                format!("{} ({})", NOT_FOUND.description, error.entity()),
            ),
            DomainErrorKind::AlreadyExists => {
                Self::from_entry(&ALREADY_EXISTS, ALREADY_EXISTS.description.to_owned())
            }
            DomainErrorKind::CouldNotBeCreated => Self::from_entry(
                &COULD_NOT_BE_CREATED,
                COULD_NOT_BE_CREATED.description.to_owned(),
            ),
            DomainErrorKind::CouldNotBeUpdated => Self::from_entry(
                &COULD_NOT_BE_UPDATED,
                COULD_NOT_BE_UPDATED.description.to_owned(),
            ),
            DomainErrorKind::CouldNotBeDeleted => Self::from_entry(
                &COULD_NOT_BE_DELETED,
                COULD_NOT_BE_DELETED.description.to_owned(),
            ),
            DomainErrorKind::MismatchedRevision => Self::from_entry(
                &MISMATCHED_REVISION,
                MISMATCHED_REVISION.description.to_owned(),
            ),
            DomainErrorKind::SpecificationViolated(violation) => Self::from_entry(
                &SPECIFICATION_VIOLATED,
                violation_description(*violation).to_owned(),
            ),
            DomainErrorKind::InvalidAttribute(violation) => {
                let entry = attribute_entry(violation.reason);
                Self::from_entry(entry, format!("{}: {}", entry.description, violation.path))
            }
        }
    }
}

impl From<&PersistenceError> for SchulConnexError {
    fn from(error: &PersistenceError) -> Self {
        let entry = match error {
            PersistenceError::Connection { .. } => &UNAVAILABLE,
            _ => &INTERNAL,
        };
        Self::from_entry(entry, entry.description.to_owned())
    }
}

impl From<&ServiceError> for SchulConnexError {
    fn from(error: &ServiceError) -> Self {
        match error {
            ServiceError::Domain(domain) => domain.into(),
            ServiceError::Persistence(persistence) => persistence.into(),
        }
    }
}
