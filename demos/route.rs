//! Builds a small two-storey office in code and prints routes found by
//! both pipelines.
//!
//! Run with `cargo run --example route`; set `RUST_LOG=floorpath=debug`
//! for per-room detail.

use floorpath::building::{Floor, Map, Polygon, Room, Transit, TransitKind};
use floorpath::math::MapPoint;
use floorpath::route::{Algorithm, FindRoute, RouteOutcome, RouteParams};
use floorpath::CancelToken;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn rect(x0: i32, y0: i32, x1: i32, y1: i32, z: i32) -> floorpath::Result<Polygon> {
    let corners = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
        .map(|(x, y)| MapPoint::new(x, y, z))
        .to_vec();
    Ok(Polygon::new(corners)?)
}

fn office() -> floorpath::Result<Map> {
    let lobby = Room::new("lobby", rect(0, 0, 60, 40, 0)?)
        .with_barrier(rect(20, 10, 26, 40, 0)?)
        .with_transit(Transit::new(rect(58, 18, 60, 22, 0)?, "d1", TransitKind::Door, 0))
        .with_transit(Transit::new(rect(4, 30, 10, 36, 0)?, "s1", TransitKind::Stairs, 12));
    let store = Room::new("store", rect(60, 0, 100, 40, 0)?)
        .with_transit(Transit::new(rect(60, 18, 62, 22, 0)?, "d1", TransitKind::Door, 0));
    let hall = Room::new("upper hall", rect(0, 0, 100, 40, 1)?)
        .with_barrier(rect(40, 0, 46, 30, 1)?)
        .with_transit(Transit::new(rect(4, 30, 10, 36, 1)?, "s1", TransitKind::Stairs, 12));

    Ok(Map::new(MapPoint::new(90, 10, 0), MapPoint::new(80, 20, 1))
        .with_floor(Floor::new(0).with_room(lobby).with_room(store))
        .with_floor(Floor::new(1).with_room(hall)))
}

fn main() -> floorpath::Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(LevelFilter::WARN.into())
        .add_directive("floorpath=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let map = office()?;
    let cancel = CancelToken::new();
    for algorithm in [Algorithm::Triangulation, Algorithm::GridHierarchical] {
        let params = RouteParams::new(algorithm).with_cluster_size(10);
        match FindRoute::new(params).execute(&map, &cancel)? {
            RouteOutcome::Found(route) if route.is_empty() => {
                println!("{algorithm:?}: no route");
            }
            RouteOutcome::Found(route) => {
                println!("{algorithm:?}: {:.1} units", route.length());
                for point in &route.waypoints {
                    println!("  {point}");
                }
            }
            RouteOutcome::Cancelled => println!("{algorithm:?}: cancelled"),
        }
    }
    Ok(())
}
