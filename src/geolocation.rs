#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}


/// Device positioning collaborator: `current_position` is the one-shot
/// lookup used when a submission lacks coordinates, `watch_position` the
/// continuous location-found stream behind the map's live marker.
pub trait Geolocation {
    fn current_position(&self) -> Result<Position, String>;

    fn watch_position(&self, listener: Box<dyn FnMut(Position) + Send>);
}


/// Binding for hosts without a positioning device. One-shot lookups fail
/// with a reason and the watch stream stays silent.
pub struct NoDevice;

impl Geolocation for NoDevice {
    fn current_position(&self) -> Result<Position, String> {
        Err("No positioning device available".into())
    }

    fn watch_position(&self, _listener: Box<dyn FnMut(Position) + Send>) {}
}
