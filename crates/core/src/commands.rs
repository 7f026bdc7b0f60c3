//! User-level commands triggered by the keyboard

/// Something the user asked for, independent of the key that triggered it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    IncreaseWidth,
    DecreaseWidth,
    /// Held delete key: the next stroke hovered is removed
    ArmDelete,
    DisarmDelete,
    /// Open the color picker for the selected stroke
    PickColor,
    NextPage,
    PrevPage,
    ShowHelp,
}

pub const HELP_TEXT: &str = "\
Draw with the left mouse button. Press on an existing stroke to select and drag it.

Keys:
  q          quit
  + / =      increase width of the selected stroke
  -          decrease width of the selected stroke
  d (hold)   delete strokes under the pointer
  c          change color of the selected stroke
  n / Right  next page
  p / Left   previous page
  h          show this help";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_text_mentions_every_key() {
        for key in ["q ", "+ / =", "- ", "d (hold)", "c ", "n / Right", "p / Left", "h "] {
            assert!(HELP_TEXT.contains(key), "help text is missing {key:?}");
        }
    }
}
