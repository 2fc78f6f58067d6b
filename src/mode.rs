/// セッションの現在のモード
///
/// 状態そのものは `session::State` が持ち、これは表示や分岐用の判別子。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Naming,
    Editing,
    Listing,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Idle => "",
            Mode::Naming => "-- NEW NOTE --",
            Mode::Editing => "-- EDIT --",
            Mode::Listing => "-- NOTES --",
        }
    }
}
