use serde::{Deserialize, Serialize};

use crate::auth::PetId;

/// The human account that owns one or more pets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Responsible {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: String,
    pub breed: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub residence: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub responsible_id: String,
    #[serde(default)]
    pub responsible: Option<Responsible>,
}

/// `/pets/all` answers either with a bare array or with `{ "pets": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PetList {
    Bare(Vec<Pet>),
    Wrapped { pets: Vec<Pet> },
}

impl From<PetList> for Vec<Pet> {
    fn from(list: PetList) -> Self {
        match list {
            PetList::Bare(pets) | PetList::Wrapped { pets } => pets,
        }
    }
}
