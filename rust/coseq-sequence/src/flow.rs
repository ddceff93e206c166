/// Decision returned by a visitor: keep traversing or stop right away.
///
/// Visitors may return `Flow` directly, `()` (always continue) or `bool`
/// (`false` stops).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flow {
    #[default]
    Continue,
    Stop,
}

impl Flow {
    #[inline]
    pub fn is_stop(self) -> bool {
        self == Flow::Stop
    }
}

impl From<()> for Flow {
    fn from(_: ()) -> Self {
        Flow::Continue
    }
}

impl From<bool> for Flow {
    fn from(keep_going: bool) -> Self {
        if keep_going { Flow::Continue } else { Flow::Stop }
    }
}
