use std::{
    fs::{self, File},
    io::{Seek, Write},
    path::Path,
};

use itertools::Itertools;
use serde::Serialize;
use synthesis::SynthesisResult;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    data_model::{
        routes::RoutesRow,
        shapes::ShapesRow,
        stop_times::{DropOffMethod, PickupMethod, StopTimesRow},
        stops::StopsRow,
        trips::{TravelDirection, TripsRow},
    },
    domain_model::shape::ShapeSet,
    error::ExportError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One `.txt` file per table in a directory.
    #[default]
    Directory,
    Zip,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "dir" | "directory" => Some(Self::Directory),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }
}

/// The GTFS schedule files derived from a synthesis result. Only revenue trips
/// are published.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GtfsFeed {
    pub stops: Vec<StopsRow>,
    pub routes: Vec<RoutesRow>,
    pub trips: Vec<TripsRow>,
    pub stop_times: Vec<StopTimesRow>,
    pub shapes: Vec<ShapesRow>,
}

impl GtfsFeed {
    pub fn from_result(result: &SynthesisResult) -> Self {
        let shapes = ShapeSet::build(result);
        let mut feed = Self {
            stops: result.stops.iter().map(StopsRow::from).collect(),
            shapes: shapes.shapes.iter().flat_map(|shape| shape.rows()).collect(),
            ..Self::default()
        };

        for trip in result.trips.iter().filter(|trip| trip.kind.is_revenue()) {
            let Some(route_id) = &trip.route_id else {
                log::warn!("revenue trip {} has no route, not exported", trip.id);
                continue;
            };
            feed.trips.push(TripsRow {
                route_id: route_id.clone(),
                service_id: trip.service_id.clone(),
                trip_id: trip.id.raw(),
                direction: TravelDirection::from_direction_id(trip.direction_id),
                block_id: trip.block_id.clone(),
                shape_id: shapes.shape_of(&trip.id).map(|shape_id| shape_id.raw()),
            });

            let visits = result
                .visits_of(&trip.id)
                .sorted_by_key(|visit| visit.sequence)
                .collect::<Vec<_>>();
            let last = visits.len().saturating_sub(1);
            feed.stop_times
                .extend(visits.iter().enumerate().map(|(index, visit)| StopTimesRow {
                    trip_id: trip.id.raw(),
                    arrival_time: visit.arrival_time,
                    departure_time: visit.departure_time,
                    stop_id: visit.stop_id.raw(),
                    stop_sequence: visit.sequence,
                    pickup_type: if index == last {
                        PickupMethod::NotAvailable
                    } else {
                        PickupMethod::RegularlyScheduled
                    },
                    drop_off_type: if index == 0 {
                        DropOffMethod::NotAvailable
                    } else {
                        DropOffMethod::RegularlyScheduled
                    },
                    shape_dist_traveled: visit.distance_traveled_km,
                }));
        }

        feed.routes = feed
            .trips
            .iter()
            .map(|trip| trip.route_id.as_str())
            .unique()
            .map(RoutesRow::bus)
            .collect();

        log::info!(
            "feed has {} stops, {} routes, {} trips, {} stop times and {} shape points",
            feed.stops.len(),
            feed.routes.len(),
            feed.trips.len(),
            feed.stop_times.len(),
            feed.shapes.len()
        );
        feed
    }

    /// Encodes every table as a named `.txt` file.
    fn encode_tables(&self) -> Result<Vec<(&'static str, Vec<u8>)>, ExportError> {
        Ok(vec![
            ("stops.txt", encode_csv(&self.stops)?),
            ("routes.txt", encode_csv(&self.routes)?),
            ("trips.txt", encode_csv(&self.trips)?),
            ("stop_times.txt", encode_csv(&self.stop_times)?),
            ("shapes.txt", encode_csv(&self.shapes)?),
        ])
    }

    pub fn export_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<(), ExportError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        for (name, content) in self.encode_tables()? {
            fs::write(dir.join(name), content)?;
            log::debug!("wrote {}", dir.join(name).display());
        }
        log::info!("exported feed to {}", dir.display());
        Ok(())
    }

    pub fn write_zip<W: Write + Seek>(&self, writer: W) -> Result<W, ExportError> {
        let mut archive = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in self.encode_tables()? {
            archive.start_file(name, options)?;
            archive.write_all(&content)?;
        }
        Ok(archive.finish()?)
    }

    pub fn export_to_zip<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.write_zip(File::create(path)?)?;
        log::info!("exported feed to {}", path.display());
        Ok(())
    }

    pub fn export<P: AsRef<Path>>(&self, path: P, format: ExportFormat) -> Result<(), ExportError> {
        match format {
            ExportFormat::Directory => self.export_to_dir(path),
            ExportFormat::Zip => self.export_to_zip(path),
        }
    }
}

/// Writes rows with a header line taken from the first row.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn encode_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, ExportError> {
    let mut buffer = vec![];
    write_csv(&mut buffer, rows)?;
    Ok(buffer)
}
