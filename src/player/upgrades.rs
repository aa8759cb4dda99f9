//! Purchased upgrades applied to the player.

use super::state::{
    ChargeGauge, Gun, HealthGauge, Player, PlayerUpgrade, PlayerVitals, Thruster, WeaponHeat,
};
use crate::config::TuningConfig;
use bevy::prelude::*;

type UpgradeTarget<'a> = (
    &'a mut PlayerVitals,
    &'a mut WeaponHeat,
    &'a mut Gun,
    &'a mut Thruster,
    &'a mut HealthGauge,
    &'a mut ChargeGauge,
);

/// Apply one upgrade to the player's components.
pub fn apply_upgrade(upgrade: PlayerUpgrade, target: UpgradeTarget<'_>, config: &TuningConfig) {
    let (vitals, heat, gun, thruster, health_gauge, charge_gauge) = target;
    match upgrade {
        PlayerUpgrade::Heal => {
            vitals.heal(config.heal_amount);
            health_gauge.0.set_value(vitals.hp);
        }
        PlayerUpgrade::Damage => {
            gun.speed += config.upgrade_projectile_speed_step;
            heat.max_charge += config.upgrade_max_charge_step;
            heat.decay_rate += config.upgrade_charge_decay_step;
            charge_gauge.0.set_max_value(heat.max_charge);
        }
        PlayerUpgrade::Speed => {
            thruster.thrust_power += config.upgrade_thrust_step;
            thruster.max_velocity += config.upgrade_max_velocity_step;
        }
        PlayerUpgrade::Shield => {
            vitals.grant_shield(config.shield_charges);
        }
    }
}

pub fn player_upgrade_system(
    mut upgrades: MessageReader<PlayerUpgrade>,
    config: Res<TuningConfig>,
    mut q_player: Query<
        (
            &mut PlayerVitals,
            &mut WeaponHeat,
            &mut Gun,
            &mut Thruster,
            &mut HealthGauge,
            &mut ChargeGauge,
        ),
        With<Player>,
    >,
) {
    let Ok((mut vitals, mut heat, mut gun, mut thruster, mut health, mut charge)) =
        q_player.single_mut()
    else {
        upgrades.clear();
        return;
    };
    for upgrade in upgrades.read() {
        apply_upgrade(
            *upgrade,
            (
                &mut *vitals,
                &mut *heat,
                &mut *gun,
                &mut *thruster,
                &mut *health,
                &mut *charge,
            ),
            &config,
        );
        info!("Applied upgrade {upgrade:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauge::Gauge;

    struct Loadout {
        vitals: PlayerVitals,
        heat: WeaponHeat,
        gun: Gun,
        thruster: Thruster,
        health: HealthGauge,
        charge: ChargeGauge,
    }

    impl Loadout {
        fn new() -> Self {
            Self {
                vitals: PlayerVitals::new(10.0),
                heat: WeaponHeat::default(),
                gun: Gun::default(),
                thruster: Thruster::default(),
                health: HealthGauge(Gauge::new(Color::BLACK, Color::WHITE)),
                charge: ChargeGauge(Gauge::new(Color::BLACK, Color::WHITE)),
            }
        }

        fn apply(&mut self, upgrade: PlayerUpgrade, cfg: &TuningConfig) {
            apply_upgrade(
                upgrade,
                (
                    &mut self.vitals,
                    &mut self.heat,
                    &mut self.gun,
                    &mut self.thruster,
                    &mut self.health,
                    &mut self.charge,
                ),
                cfg,
            );
        }
    }

    #[test]
    fn heal_clamps_to_max() {
        let cfg = TuningConfig::default();
        let mut l = Loadout::new();
        l.vitals.hp = 9.5;
        l.apply(PlayerUpgrade::Heal, &cfg);
        assert_eq!(l.vitals.hp, 10.0);
    }

    #[test]
    fn damage_upgrade_raises_gun_and_heat_limits() {
        let cfg = TuningConfig::default();
        let mut l = Loadout::new();
        l.apply(PlayerUpgrade::Damage, &cfg);
        assert_eq!(l.gun.speed, cfg.projectile_speed + cfg.upgrade_projectile_speed_step);
        assert_eq!(l.heat.max_charge, cfg.max_charge + cfg.upgrade_max_charge_step);
        assert_eq!(l.heat.decay_rate, cfg.charge_decay + cfg.upgrade_charge_decay_step);
    }

    #[test]
    fn speed_upgrade_raises_thrust_and_cap() {
        let cfg = TuningConfig::default();
        let mut l = Loadout::new();
        l.apply(PlayerUpgrade::Speed, &cfg);
        assert_eq!(l.thruster.thrust_power, cfg.thrust_power + cfg.upgrade_thrust_step);
        assert_eq!(l.thruster.max_velocity, cfg.max_velocity + cfg.upgrade_max_velocity_step);
    }

    #[test]
    fn shield_upgrade_refills_charges() {
        let cfg = TuningConfig::default();
        let mut l = Loadout::new();
        l.vitals.shield_charges = 1;
        l.apply(PlayerUpgrade::Shield, &cfg);
        assert_eq!(l.vitals.shield_charges, cfg.shield_charges);
        assert!(l.vitals.shield_visual);
    }
}
