use eframe::egui::{Vec2, vec2};
use flight_graph::sim::{ActiveForces, ForceKind};
use flight_graph::{
    Canvas, FlightNetwork, GeoScales, LayoutMode, Simulation, SimulationConfig, SimulationError,
    SimulationState, flights::parse_dataset,
};

const CANVAS: Canvas = Canvas {
    width: 960.0,
    height: 600.0,
};

fn coast_to_coast() -> FlightNetwork {
    let dataset = parse_dataset(
        r#"{
            "airports": [
                { "id": "JFK", "weight": 100, "geoLat": 40.6, "geoLon": -73.8 },
                { "id": "LAX", "weight": 80, "geoLat": 33.9, "geoLon": -118.4 }
            ],
            "routes": [{ "source": "JFK", "destination": "LAX", "weight": 50 }]
        }"#,
    )
    .unwrap();
    FlightNetwork::from_dataset(dataset).unwrap()
}

fn scenario_config() -> SimulationConfig {
    SimulationConfig {
        alpha_decay: 0.02,
        velocity_decay: 0.4,
        ..SimulationConfig::default()
    }
}

fn build(network: &FlightNetwork, config: SimulationConfig) -> (Simulation, GeoScales) {
    let points = network.geo_points().collect::<Vec<_>>();
    let scales = GeoScales::fit(&points, CANVAS, 40.0);
    let simulation = Simulation::new(network, CANVAS, &scales, config).unwrap();
    (simulation, scales)
}

fn position(simulation: &Simulation, id: &str) -> Vec2 {
    let index = simulation.index_of(id).unwrap();
    simulation.particles()[index].position
}

#[test]
fn particles_are_finite_after_construction() {
    let (simulation, _) = build(&coast_to_coast(), scenario_config());
    assert_eq!(simulation.len(), 2);
    for particle in simulation.particles() {
        assert!(particle.position.is_finite());
        assert!(particle.velocity.is_finite());
        assert_eq!(particle.velocity, Vec2::ZERO);
    }
}

#[test]
fn links_resolve_to_live_particles() {
    let (simulation, _) = build(&coast_to_coast(), scenario_config());
    for link in simulation.links() {
        assert!(simulation.particles().get(link.source).is_some());
        assert!(simulation.particles().get(link.target).is_some());
    }
    assert_eq!(simulation.airport(simulation.links()[0].source).unwrap().id, "JFK");
    assert_eq!(simulation.airport(simulation.links()[0].target).unwrap().id, "LAX");
}

#[test]
fn route_to_unknown_airport_fails_construction() {
    let mut network = coast_to_coast();
    network.routes[0].destination = "SFO".to_owned();
    let points = network.geo_points().collect::<Vec<_>>();
    let scales = GeoScales::fit(&points, CANVAS, 40.0);

    let error = Simulation::new(&network, CANVAS, &scales, scenario_config())
        .err()
        .unwrap();
    assert!(matches!(
        error,
        SimulationError::MissingNode { ref missing, .. } if missing == "SFO"
    ));
}

#[test]
fn setting_network_mode_twice_is_idempotent() {
    let (mut simulation, _) = build(&coast_to_coast(), scenario_config());
    simulation.set_mode(LayoutMode::Network);
    let once = simulation.active_forces();
    simulation.set_mode(LayoutMode::Network);
    assert_eq!(simulation.active_forces(), once);
    assert_eq!(once, LayoutMode::Network.forces());
}

#[test]
fn alpha_decays_monotonically_toward_target() {
    let (mut simulation, _) = build(&coast_to_coast(), scenario_config());
    let mut previous = simulation.alpha();
    for _ in 0..500 {
        let alpha = simulation.tick().alpha;
        assert!(alpha < previous, "alpha {alpha} did not fall below {previous}");
        assert!(alpha >= simulation.alpha_target());
        previous = alpha;
    }
    assert_eq!(simulation.state(), SimulationState::Resting);
}

#[test]
fn pinned_particle_holds_its_pin() {
    let (mut simulation, _) = build(&coast_to_coast(), scenario_config());
    let jfk = simulation.index_of("JFK").unwrap();
    simulation.drag_start(jfk).unwrap();
    simulation.drag_move(jfk, vec2(321.5, 123.25)).unwrap();

    for _ in 0..200 {
        let snapshot = simulation.tick();
        assert_eq!(snapshot.particles()[jfk].position, vec2(321.5, 123.25));
    }
}

#[test]
fn centering_alone_pulls_centroid_to_canvas_center() {
    let (mut simulation, _) = build(&coast_to_coast(), scenario_config());
    simulation.set_active_forces(ActiveForces::only(ForceKind::Center));
    let jfk = simulation.index_of("JFK").unwrap();
    simulation.drag_start(jfk).unwrap();
    simulation.drag_move(jfk, vec2(50.0, 50.0)).unwrap();
    simulation.tick();
    simulation.drag_end(jfk).unwrap();

    for _ in 0..100 {
        simulation.tick();
    }
    let centroid = simulation.centroid().unwrap();
    assert!((centroid - CANVAS.center()).length() < 0.5, "centroid {centroid:?}");
}

#[test]
fn network_mode_settles_near_rest_length() {
    let config = scenario_config();
    let rest_length = config.link.distance;
    let (mut simulation, _) = build(&coast_to_coast(), config);

    for _ in 0..300 {
        simulation.tick();
    }

    let distance = (position(&simulation, "JFK") - position(&simulation, "LAX")).length();
    assert!(
        (distance - rest_length).abs() < 3.0,
        "distance {distance} far from rest length {rest_length}"
    );
}

#[test]
fn map_mode_settles_on_geographic_anchors() {
    let network = coast_to_coast();
    let (mut simulation, scales) = build(&network, scenario_config());
    simulation.set_mode(LayoutMode::Map);

    for _ in 0..300 {
        simulation.tick();
    }

    for airport in &network.airports {
        let anchor = flight_graph::Projection::project(&scales, airport.geo);
        let error = (position(&simulation, &airport.id) - anchor).length();
        assert!(error < 1.0, "{} is {error}px from its anchor", airport.id);
    }
}

#[test]
fn dragging_jfk_holds_it_while_lax_follows() {
    let (mut simulation, _) = build(&coast_to_coast(), scenario_config());
    for _ in 0..100 {
        simulation.tick();
    }

    let jfk = simulation.index_of("JFK").unwrap();
    let alpha_before = simulation.alpha();
    simulation.drag_start(jfk).unwrap();
    simulation.drag_move(jfk, vec2(100.0, 100.0)).unwrap();
    assert!(simulation.alpha() >= alpha_before);

    let lax_start = position(&simulation, "LAX");
    for _ in 0..50 {
        simulation.tick();
        assert_eq!(position(&simulation, "JFK"), vec2(100.0, 100.0));
    }
    let lax_end = position(&simulation, "LAX");
    assert!((lax_start - lax_end).length() > 1.0);

    let target_while_dragging = simulation.alpha_target();
    simulation.drag_end(jfk).unwrap();
    assert!(simulation.alpha_target() < target_while_dragging);
    assert!(!simulation.particles()[jfk].is_pinned());
}

#[test]
fn mode_switch_reheats_a_resting_simulation() {
    let (mut simulation, _) = build(&coast_to_coast(), scenario_config());
    for _ in 0..600 {
        simulation.tick();
    }
    assert_eq!(simulation.state(), SimulationState::Resting);

    let resting_target = simulation.alpha_target();
    simulation.set_mode(LayoutMode::Map);
    assert_eq!(simulation.state(), SimulationState::Reheated);
    assert_eq!(simulation.alpha(), simulation.config().mode_switch_alpha);
    assert_eq!(simulation.alpha_target(), resting_target);
    assert_eq!(simulation.tick().state, SimulationState::Cooling);

    for _ in 0..600 {
        simulation.tick();
    }
    assert_eq!(simulation.state(), SimulationState::Resting);
}
