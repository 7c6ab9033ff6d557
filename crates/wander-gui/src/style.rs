// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use iced::widget::{button, container, text_input};
use iced::{Background, Border, Color, Shadow, Theme};

pub mod palette {
    use iced::Color;

    pub const BACKGROUND: Color = Color::from_rgb(0.12, 0.12, 0.12); // #1e1e1e
    pub const SURFACE: Color = Color::from_rgb(0.18, 0.18, 0.18); // #2d2d2d
    pub const ACCENT_BLUE: Color = Color::from_rgb(0.23, 0.51, 0.96); // #3b82f6
    pub const ACCENT_ORANGE: Color = Color::from_rgb(0.98, 0.45, 0.09); // #f97316
    pub const ACCENT_GREEN: Color = Color::from_rgb(0.2, 0.7, 0.3); // #33b34d
    pub const ACCENT_PURPLE: Color = Color::from_rgb(0.66, 0.33, 0.97); // #a855f7
    pub const ACCENT_RED: Color = Color::from_rgb(0.86, 0.2, 0.2);
    pub const TEXT_PRIMARY: Color = Color::from_rgb(0.9, 0.9, 0.9);
    pub const TEXT_SECONDARY: Color = Color::from_rgb(0.6, 0.6, 0.6);
    pub const BORDER: Color = Color::from_rgb(0.25, 0.25, 0.25);

    pub const MAP_BACKGROUND: Color = Color::from_rgb(0.05, 0.05, 0.05);
    pub const MAP_TILE_LOADING: Color = Color::from_rgb(0.1, 0.1, 0.1);
    pub const ROUTE_LINE: Color = Color::from_rgb(0.23, 0.51, 0.96);
}

fn rounded(radius: f32) -> Border {
    Border {
        radius: radius.into(),
        ..Default::default()
    }
}

fn glow(color: Color, alpha: f32, blur_radius: f32) -> Shadow {
    Shadow {
        color: Color { a: alpha, ..color },
        offset: iced::Vector::new(0.0, 2.0),
        blur_radius,
    }
}

// Container Styles
pub fn container_sidebar(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::BACKGROUND)),
        border: Border {
            color: palette::BORDER,
            width: 1.0,
            radius: 0.0.into(),
        },
        ..Default::default()
    }
}

pub fn container_card(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::SURFACE)),
        border: Border {
            color: palette::BORDER,
            width: 1.0,
            radius: 8.0.into(),
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
            offset: iced::Vector::new(0.0, 4.0),
            blur_radius: 12.0,
        },
        text_color: Some(palette::TEXT_PRIMARY),
    }
}

pub fn container_modal_backdrop(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.7))),
        ..Default::default()
    }
}

pub fn container_toast_info(theme: &Theme) -> container::Style {
    container::Style {
        border: Border {
            color: palette::ACCENT_GREEN,
            width: 1.0,
            radius: 6.0.into(),
        },
        ..container_card(theme)
    }
}

pub fn container_toast_error(theme: &Theme) -> container::Style {
    container::Style {
        border: Border {
            color: palette::ACCENT_RED,
            width: 1.0,
            radius: 6.0.into(),
        },
        ..container_card(theme)
    }
}

// Button Styles
fn filled(accent: Color, hover: Color, status: button::Status) -> button::Style {
    let base = button::Style {
        background: Some(Background::Color(accent)),
        text_color: Color::WHITE,
        border: rounded(6.0),
        shadow: Shadow::default(),
    };

    match status {
        button::Status::Active => button::Style {
            shadow: glow(accent, 0.4, 8.0),
            ..base
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(hover)),
            shadow: glow(accent, 0.6, 12.0),
            ..base
        },
        button::Status::Pressed => base,
        button::Status::Disabled => button::Style {
            background: Some(Background::Color(Color { a: 0.4, ..accent })),
            text_color: palette::TEXT_SECONDARY,
            ..base
        },
    }
}

pub fn button_primary(_theme: &Theme, status: button::Status) -> button::Style {
    filled(palette::ACCENT_BLUE, Color::from_rgb(0.3, 0.6, 1.0), status)
}

pub fn button_success(_theme: &Theme, status: button::Status) -> button::Style {
    filled(palette::ACCENT_GREEN, Color::from_rgb(0.25, 0.8, 0.35), status)
}

pub fn button_danger(_theme: &Theme, status: button::Status) -> button::Style {
    filled(palette::ACCENT_RED, Color::from_rgb(0.95, 0.3, 0.3), status)
}

pub fn button_secondary(_theme: &Theme, status: button::Status) -> button::Style {
    let base = button::Style {
        background: Some(Background::Color(palette::SURFACE)),
        text_color: palette::TEXT_PRIMARY,
        border: Border {
            color: palette::BORDER,
            width: 1.0,
            radius: 6.0.into(),
        },
        shadow: Shadow::default(),
    };

    match status {
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.25, 0.25, 0.25))),
            text_color: Color::WHITE,
            shadow: glow(Color::BLACK, 0.3, 8.0),
            ..base
        },
        _ => base,
    }
}

/// Text-only button, used for links and search results.
pub fn button_ghost(_theme: &Theme, status: button::Status) -> button::Style {
    let base = button::Style {
        background: None,
        text_color: palette::TEXT_PRIMARY,
        border: Border::default(),
        shadow: Shadow::default(),
    };

    match status {
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.1))),
            text_color: Color::WHITE,
            border: rounded(6.0),
            ..base
        },
        _ => base,
    }
}

pub fn button_link(theme: &Theme, status: button::Status) -> button::Style {
    button::Style {
        text_color: palette::ACCENT_BLUE,
        ..button_ghost(theme, status)
    }
}

pub fn search_input(theme: &Theme, status: text_input::Status) -> text_input::Style {
    let focused = matches!(status, text_input::Status::Focused);
    text_input::Style {
        background: Background::Color(palette::SURFACE),
        border: Border {
            color: if focused {
                palette::ACCENT_BLUE
            } else {
                palette::BORDER
            },
            width: 1.0,
            radius: 6.0.into(),
        },
        ..text_input::default(theme, status)
    }
}
