use crate::foundation::error::{MemeError, MemeResult};

/// A predefined, named background image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    pub popular: bool,
}

impl Template {
    /// Relative path of the locally mirrored copy, under the configured assets root.
    pub fn local_path(&self) -> String {
        format!("templates/{}.jpg", self.id)
    }
}

pub const TEMPLATES: &[Template] = &[
    Template {
        id: "drake",
        name: "Drake Pointing",
        url: "https://imgflip.com/s/meme/Drake-Pointing.jpg",
        popular: true,
    },
    Template {
        id: "distracted-bf",
        name: "Distracted Boyfriend",
        url: "https://imgflip.com/s/meme/Distracted-Boyfriend.jpg",
        popular: true,
    },
    Template {
        id: "change-my-mind",
        name: "Change My Mind",
        url: "https://imgflip.com/s/meme/Change-My-Mind.jpg",
        popular: false,
    },
    Template {
        id: "expanding-brain",
        name: "Expanding Brain",
        url: "https://imgflip.com/s/meme/Expanding-Brain.jpg",
        popular: true,
    },
    Template {
        id: "woman-yelling",
        name: "Woman Yelling at Cat",
        url: "https://imgflip.com/s/meme/Woman-Yelling-At-Cat.jpg",
        popular: true,
    },
    Template {
        id: "success-kid",
        name: "Success Kid",
        url: "https://imgflip.com/s/meme/Success-Kid.jpg",
        popular: false,
    },
];

/// Resolve a template by id or by display name (ASCII case-insensitive).
pub fn find_template(key: &str) -> MemeResult<&'static Template> {
    let key = key.trim();
    TEMPLATES
        .iter()
        .find(|t| t.id.eq_ignore_ascii_case(key) || t.name.eq_ignore_ascii_case(key))
        .ok_or_else(|| MemeError::validation(format!("unknown template '{key}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/templates/catalog.rs"]
mod tests;
