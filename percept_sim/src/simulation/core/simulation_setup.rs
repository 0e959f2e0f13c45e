// percept_sim/src/simulation/core/simulation_setup.rs

use std::time::Duration;

use avian3d::prelude::{AngularVelocity, Collider, Gravity, LinearVelocity, RigidBody};
use chrono::{DateTime, Utc};
use percept_core::types::GroundTruth;

use crate::prelude::*;
use crate::simulation::core::components::GroundTruthState;
use crate::simulation::core::events::MeasurementEvent;
use crate::simulation::core::ground_truth_sync_system;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::transforms::enu_vector_to_bevy_vector;

const DEFAULT_PHYSICS_RATE: f64 = 400.0;

/// UTC instant that simulation time zero corresponds to.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimulationEpoch(pub DateTime<Utc>);

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        // The scenario is inserted by the binary before this plugin is added.
        let config = match app.world().get_resource::<ScenarioConfig>() {
            Some(config) => config.clone(),
            None => {
                warn!("No ScenarioConfig resource found; running with defaults.");
                ScenarioConfig::default()
            }
        };

        // --- 1. Add the Deterministic PRNG Resource ---
        app.insert_resource(SimulationRng::new(config.simulation.seed));
        app.insert_resource(SimulationEpoch(
            config.simulation.utc_epoch.unwrap_or_else(Utc::now),
        ));

        // --- 2. Physics configuration ---
        let mut physics_rate = config.simulation.physics_rate;
        if !physics_rate.is_finite() || physics_rate <= 0.0 {
            error!(
                "Invalid physics_rate {}; falling back to {} Hz.",
                physics_rate, DEFAULT_PHYSICS_RATE
            );
            physics_rate = DEFAULT_PHYSICS_RATE;
        }
        app.insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f64(
            1.0 / physics_rate,
        )))
        .insert_resource(Gravity(enu_vector_to_bevy_vector(&config.world.gravity)))
        .insert_resource(config)
        .add_event::<MeasurementEvent>();

        // --- 3. Configure the spawning pipeline ---
        app.configure_sets(
            OnEnter(AppState::SceneBuilding),
            (
                SceneBuildSet::CreateRequests,
                SceneBuildSet::ProcessSensors,
                SceneBuildSet::Physics,
                SceneBuildSet::Cleanup,
            )
                .chain(),
        );

        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                spawn_agent_shells.in_set(SceneBuildSet::CreateRequests),
                attach_agent_bodies.in_set(SceneBuildSet::Physics),
                cleanup_spawn_requests.in_set(SceneBuildSet::Cleanup),
                transition_to_running
                    .in_set(SceneBuildSet::Cleanup)
                    .after(cleanup_spawn_requests),
            ),
        );

        // --- 4. Configure the runtime schedule graph ---
        // Avian steps in FixedPostUpdate, so the state read here is the
        // result of the previous fixed step.
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::StateSync,
                SimulationSet::Sensors,
                SimulationSet::Reporting,
            )
                .chain()
                .run_if(in_state(AppState::Running)),
        );

        app.add_systems(
            FixedUpdate,
            (
                ground_truth_sync_system.in_set(SimulationSet::StateSync),
                exit_after_duration.in_set(SimulationSet::Reporting),
            ),
        );
    }
}

fn spawn_agent_shells(mut commands: Commands, config: Res<ScenarioConfig>) {
    for agent_config in &config.agents {
        info!(
            "[SPAWN] Posting spawn request for agent: {}",
            &agent_config.name
        );
        for sensor in &agent_config.sensors {
            debug!(
                "[SPAWN]   {} sensor '{}'",
                sensor.get_kind_str(),
                sensor.get_name()
            );
        }

        let start_pose = agent_config.starting_pose.to_pose();
        commands.spawn((
            Name::new(agent_config.name.clone()),
            GroundTruthState(GroundTruth {
                pose: start_pose,
                linear_velocity: Some(agent_config.linear_velocity),
                angular_velocity: Some(agent_config.angular_velocity),
            }),
            agent_config.starting_pose.to_bevy_transform(),
            SpawnAgentConfigRequest(agent_config.clone()),
        ));
    }
}

/// Agents are kinematic bodies: they follow their configured velocity and
/// are only there to be sensed and to carry sensors.
fn attach_agent_bodies(mut commands: Commands, query: Query<(Entity, &SpawnAgentConfigRequest)>) {
    for (entity, request) in &query {
        let agent = &request.0;
        let [length, width, height] = agent.body_size;
        if [length, width, height].iter().any(|d| !d.is_finite() || *d <= 0.0) {
            error!(
                "[SPAWN] Agent '{}' has invalid body_size {:?}; spawning without a collider.",
                agent.name, agent.body_size
            );
            commands.entity(entity).insert(RigidBody::Kinematic);
        } else {
            // Body x (forward) is Bevy x, body z (up) is Bevy y.
            commands.entity(entity).insert((
                RigidBody::Kinematic,
                Collider::cuboid(length as f32, height as f32, width as f32),
            ));
        }
        commands.entity(entity).insert((
            LinearVelocity(enu_vector_to_bevy_vector(&agent.linear_velocity)),
            AngularVelocity(enu_vector_to_bevy_vector(&agent.angular_velocity)),
        ));
    }
}

fn cleanup_spawn_requests(mut commands: Commands, query: Query<Entity, With<SpawnAgentConfigRequest>>) {
    info!("[CLEANUP] Removing spawn request components.");
    for entity in &query {
        commands.entity(entity).remove::<SpawnAgentConfigRequest>();
    }
}

/// Runs once at the end of the `OnEnter(SceneBuilding)` chain and moves the
/// app into the main `Running` state.
fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("Scene building complete. Transitioning to Running state.");
    next_state.set(AppState::Running);
}

fn exit_after_duration(
    time: Res<Time>,
    config: Res<ScenarioConfig>,
    mut exit: EventWriter<AppExit>,
) {
    if time.elapsed_secs_f64() >= config.simulation.duration_seconds {
        info!(
            "Simulated {:.2}s of {:.2}s. Exiting.",
            time.elapsed_secs_f64(),
            config.simulation.duration_seconds
        );
        exit.write(AppExit::Success);
    }
}
