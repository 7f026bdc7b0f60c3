use eframe::egui::Key;
use simplepres_core::Action;

/// Map a key event to an action
///
/// Only the delete key reacts to release; everything else fires on press.
/// Auto-repeat of a held delete key does not arm it again, so one press
/// deletes at most one stroke.
pub fn action_for(key: Key, pressed: bool, repeat: bool) -> Option<Action> {
    if !pressed {
        return (key == Key::D).then_some(Action::DisarmDelete);
    }
    if repeat && key == Key::D {
        return None;
    }

    let action = match key {
        Key::Q => Action::Quit,
        Key::Plus | Key::Equals => Action::IncreaseWidth,
        Key::Minus => Action::DecreaseWidth,
        Key::D => Action::ArmDelete,
        Key::C => Action::PickColor,
        Key::N | Key::ArrowRight => Action::NextPage,
        Key::P | Key::ArrowLeft => Action::PrevPage,
        Key::H => Action::ShowHelp,
        _ => return None,
    };
    Some(action)
}
