//! Headless симуляция Skulk AI
//!
//! Спавнит смешанную популяцию, водит игрока по кругу и печатает
//! распределение агентов по states.

use std::collections::BTreeMap;

use bevy::prelude::{FixedUpdate, Vec2};
use skulk_ai::{create_headless_app, AgentManager, SimPlayer};

fn main() {
    let seed = 42;
    println!("Starting Skulk AI headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);

    {
        let mut manager = app.world_mut().resource_mut::<AgentManager>();
        for (x, y, archetype) in [
            (150.0, 0.0, "grunt"),
            (-150.0, 40.0, "wolf"),
            (-170.0, 60.0, "wolf"),
            (-160.0, 20.0, "wolf"),
            (0.0, 180.0, "soldier"),
            (30.0, 200.0, "soldier"),
            (0.0, -160.0, "berserker"),
            (120.0, -120.0, "coward"),
            (60.0, 60.0, "mimic"),
        ] {
            manager.spawn_agent(Vec2::new(x, y), archetype);
        }
        manager.add_spawn_point(Vec2::new(500.0, 500.0), "grunt");
        manager.add_spawn_point(Vec2::new(-500.0, -500.0), "wolf");
    }

    // 1000 тиков FixedUpdate (~16.7 sec при 60Hz)
    for tick in 0..1000 {
        {
            let mut player = app.world_mut().resource_mut::<SimPlayer>();
            let angle = tick as f32 * 0.01;
            player.position = Vec2::new(angle.cos(), angle.sin()) * 120.0;
        }
        app.world_mut().run_schedule(FixedUpdate);

        if tick % 100 == 0 {
            let manager = app.world().resource::<AgentManager>();
            let mut states: BTreeMap<&str, usize> = BTreeMap::new();
            for agent in manager.agents() {
                *states.entry(agent.state_name().unwrap_or("none")).or_default() += 1;
            }
            let player = app.world().resource::<SimPlayer>();
            println!(
                "Tick {}: {} agents, player hp {:.0}, states {:?}",
                tick,
                manager.len(),
                player.health.current,
                states
            );
        }
    }

    println!("Simulation complete!");
}
