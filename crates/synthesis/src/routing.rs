use model::stop::Stop;
use utility::geo::Coordinate;

/// A routed path between two stops, as returned by an external routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedLeg {
    pub distance_meters: f64,
    pub duration_seconds: Option<i64>,
    pub geometry: Vec<Coordinate>,
}

/// Source of road distances and geometry for a single origin and destination.
/// Implementations return `None` when they can not route the pair, in which
/// case segments fall back to great-circle distance and a straight line.
pub trait RoutingProvider {
    fn route(&self, from: &Stop, to: &Stop) -> Option<RoutedLeg>;
}

impl<P: RoutingProvider + ?Sized> RoutingProvider for &P {
    fn route(&self, from: &Stop, to: &Stop) -> Option<RoutedLeg> {
        (**self).route(from, to)
    }
}

impl<P: RoutingProvider + ?Sized> RoutingProvider for Box<P> {
    fn route(&self, from: &Stop, to: &Stop) -> Option<RoutedLeg> {
        (**self).route(from, to)
    }
}

/// Used when no routing service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRouting;

impl RoutingProvider for NoRouting {
    fn route(&self, _from: &Stop, _to: &Stop) -> Option<RoutedLeg> {
        None
    }
}
