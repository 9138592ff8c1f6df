/// Fetch cycle shared by the map snapshot and the report list:
/// `Idle → Loading → {Ready, Failed}`. There is no retry transition;
/// a failed fetch stays failed until the component is mounted again.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        match self {
            FetchState::Loading => true,
            _ => false,
        }
    }
}
