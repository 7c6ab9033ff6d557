// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use crate::features::{FeatureId, Landmark};
use crate::route::DestinationTarget;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};

/// What opens a marker popup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupTrigger {
    #[default]
    Hover,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormAction {
    Add,
    Save,
}

impl FormAction {
    pub fn endpoint(self) -> &'static str {
        match self {
            FormAction::Add => "/add_destination",
            FormAction::Save => "/save_destination",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormAction::Add => "Add destination",
            FormAction::Save => "Save",
        }
    }

    fn form_class(self) -> &'static str {
        match self {
            FormAction::Add => "popUpAdd",
            FormAction::Save => "popUpSave",
        }
    }
}

/// One of the two forms embedded in a landmark popup. The landmark id is the
/// only thing a submission needs; handlers never look at the popup markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PopupForm {
    pub action: FormAction,
    pub landmark_id: FeatureId,
}

impl PopupForm {
    pub fn target(&self) -> DestinationTarget {
        DestinationTarget::Landmark(self.landmark_id.clone())
    }

    /// Rebuilds a submission from the markup attributes (`class` of the form,
    /// `data-id` of its button).
    pub fn from_attributes(form_class: &str, data_id: &str) -> Option<Self> {
        let action = match form_class {
            "popUpAdd" => FormAction::Add,
            "popUpSave" => FormAction::Save,
            _ => return None,
        };
        if data_id.is_empty() {
            return None;
        }
        Some(Self {
            action,
            landmark_id: FeatureId::from(data_id),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkPopup {
    pub landmark_id: FeatureId,
    pub title: String,
    pub detail_path: String,
    pub description: String,
    pub min_width: u32,
}

impl LandmarkPopup {
    pub fn for_landmark(landmark: &Landmark) -> Self {
        Self {
            landmark_id: landmark.id.clone(),
            title: landmark.name.clone(),
            detail_path: landmark.detail_path(),
            description: landmark.description.clone(),
            min_width: 120,
        }
    }

    pub fn forms(&self) -> [PopupForm; 2] {
        [
            PopupForm {
                action: FormAction::Add,
                landmark_id: self.landmark_id.clone(),
            },
            PopupForm {
                action: FormAction::Save,
                landmark_id: self.landmark_id.clone(),
            },
        ]
    }

    pub fn to_html(&self) -> String {
        let id = self.landmark_id.to_string();
        let id_attr = encode_double_quoted_attribute(&id);
        let name_attr = encode_double_quoted_attribute(&self.title);

        let mut html = format!(
            "<h2><a href=\"{}\">{}</a></h2>{}",
            encode_double_quoted_attribute(&self.detail_path),
            encode_text(&self.title),
            encode_text(&self.description)
        );
        for form in self.forms() {
            html.push_str(&format!(
                "<form action=\"{endpoint}\" method=\"POST\" class=\"{class}\">\
                 <input type=\"hidden\" name=\"landmark_id\" value=\"{id}\">\
                 <button class=\"{class}\" data-id=\"{id}\" data-name=\"{name}\">{label}</button>\
                 </form>",
                endpoint = form.action.endpoint(),
                class = form.action.form_class(),
                id = id_attr,
                name = name_attr,
                label = form.action.label(),
            ));
        }
        html
    }
}

/// Popup of a marker on the route layer.
pub fn route_popup_html(title: &str) -> String {
    format!("<h2>{}</h2><p>Destination added</p>", encode_text(title))
}
