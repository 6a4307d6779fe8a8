//! Attack resolver: melee against an orthogonally adjacent ship.
//!
//! Resolution order once the attack is legal:
//! 1. Neutral target: captured, turn ends.
//! 2. Target has an on-attacked hook: the hook decides.
//! 3. Either side has a duel rule: immediate win/draw/loss.
//! 4. Otherwise both players declare blocks and combat waits.

use super::{ActionMode, ActionResolver, Continuation, Rules, TurnContext};
use crate::board::Position;
use crate::error::{ActionError, IllegalAction, InvariantViolation};
use crate::event::Event;
use crate::resolver::CombatResolver;
use crate::ship::{Owner, Player};

/// Melee attack on an adjacent enemy or neutral ship.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttackResolver;

impl ActionResolver for AttackResolver {
    fn mode(&self) -> ActionMode {
        ActionMode::Attack
    }

    fn can_from(&self, rules: Rules<'_>, player: Player, from: Position) -> Result<(), ActionError> {
        let ship = rules.own_ship(player, from)?;
        if !rules.capability(ship.kind)?.can_attack() {
            return Err(IllegalAction::Incapable {
                kind: ship.kind,
                mode: ActionMode::Attack,
            }
            .into());
        }
        rules.require_escort(player, ship.kind, from, None)
    }

    fn can(&self, rules: Rules<'_>, player: Player, from: Position, to: Position) -> Result<(), ActionError> {
        self.can_from(rules, player, from)?;
        let target = rules.occupied(to)?;
        if from.manhattan(to) != 1 {
            return Err(IllegalAction::NotAdjacent.into());
        }
        if target.is_owned_by(player) {
            return Err(IllegalAction::NotEnemy(to).into());
        }
        Ok(())
    }

    fn take(&self, ctx: &mut TurnContext<'_>, from: Position, to: Position) -> Result<Continuation, InvariantViolation> {
        let player = ctx.player();
        let attacker = ctx.kind_at(from)?;
        let target = ctx.ship(to)?;
        let (target_kind, target_owner) = (target.kind, target.owner);
        ctx.log(Event::Attack { from, to, player });

        if target_owner == Owner::Neutral {
            ctx.set_owner(to, Owner::Player(player))?;
            ctx.log(Event::Capture { at: to, player });
            tracing::debug!(%to, "neutral ship captured");
            return Ok(Continuation::EndTurn);
        }

        let defence = ctx.capability(target_kind)?;
        if let Some(hook) = defence.on_attack {
            return hook(ctx, from, to);
        }

        if let Some(outcome) = CombatResolver::duel(ctx.table(), attacker, target_kind)? {
            return CombatResolver::apply(ctx, from, to, outcome, None);
        }

        if ctx.capability(attacker)?.strength.is_none() {
            return Err(InvariantViolation::MissingStrength(attacker));
        }
        if defence.strength.is_none() {
            return Err(InvariantViolation::Unresolvable {
                attacker,
                target: target_kind,
            });
        }
        ctx.open_pending(from, to);
        Ok(Continuation::AwaitBlocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::{ShipFlags, ShipKind};
    use crate::state::GameState;
    use crate::tests::helpers::{layout, neutral_at, ship_at};

    fn attack(state: &mut GameState, from: Position, to: Position) -> Continuation {
        let table = crate::capability::CapabilityTable::standard();
        let mut ctx = TurnContext::new(state, &table, Player::First);
        AttackResolver.take(&mut ctx, from, to).unwrap()
    }

    fn kind(state: &GameState, row: i32, col: i32) -> Option<ShipKind> {
        state.board().get(Position::new(row, col)).map(|s| s.kind)
    }

    mod legality_tests {
        use super::*;

        #[test]
        fn diagonal_is_not_adjacent() {
            let (config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Cruiser, Player::First),
                ship_at(6, 6, ShipKind::Cruiser, Player::Second),
            ]);
            let rules = Rules::new(&state, &table, &config);
            assert_eq!(
                AttackResolver.can(rules, Player::First, Position::new(5, 5), Position::new(6, 6)),
                Err(ActionError::Illegal(IllegalAction::NotAdjacent))
            );
        }

        #[test]
        fn own_ship_is_not_a_target() {
            let (config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Cruiser, Player::First),
                ship_at(5, 6, ShipKind::Mine, Player::First),
            ]);
            let rules = Rules::new(&state, &table, &config);
            assert_eq!(
                AttackResolver.can(rules, Player::First, Position::new(5, 5), Position::new(5, 6)),
                Err(ActionError::Illegal(IllegalAction::NotEnemy(Position::new(5, 6))))
            );
        }

        #[test]
        fn mine_cannot_attack() {
            let (config, table, state) = layout(&[ship_at(5, 5, ShipKind::Mine, Player::First)]);
            let rules = Rules::new(&state, &table, &config);
            assert!(matches!(
                AttackResolver.can_from(rules, Player::First, Position::new(5, 5)),
                Err(ActionError::Illegal(IllegalAction::Incapable { .. }))
            ));
        }

        #[test]
        fn neutral_is_a_target() {
            let (config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Patrol, Player::First),
                neutral_at(4, 5, ShipKind::Battleship),
            ]);
            let rules = Rules::new(&state, &table, &config);
            assert!(AttackResolver
                .can(rules, Player::First, Position::new(5, 5), Position::new(4, 5))
                .is_ok());
        }
    }

    mod effect_tests {
        use super::*;

        #[test]
        fn neutral_is_captured() {
            let (_config, _table, mut state) = layout(&[
                ship_at(5, 5, ShipKind::Patrol, Player::First),
                neutral_at(4, 5, ShipKind::Battleship),
            ]);
            let cont = attack(&mut state, Position::new(5, 5), Position::new(4, 5));

            assert_eq!(cont, Continuation::EndTurn);
            let captured = state.board().get(Position::new(4, 5)).unwrap();
            assert!(captured.is_owned_by(Player::First));
            assert!(state
                .log()
                .events()
                .any(|e| matches!(e, Event::Capture { .. })));
        }

        #[test]
        fn fort_stormed_by_warship() {
            let (_config, _table, mut state) = layout(&[
                ship_at(5, 5, ShipKind::Destroyer, Player::First),
                ship_at(5, 6, ShipKind::Fort, Player::Second),
            ]);
            attack(&mut state, Position::new(5, 5), Position::new(5, 6));
            assert_eq!(kind(&state, 5, 6), None);
            assert_eq!(kind(&state, 5, 5), Some(ShipKind::Destroyer));
        }

        #[test]
        fn fort_sinks_submarine() {
            let (_config, _table, mut state) = layout(&[
                ship_at(5, 5, ShipKind::Submarine, Player::First),
                ship_at(5, 6, ShipKind::Fort, Player::Second),
            ]);
            attack(&mut state, Position::new(5, 5), Position::new(5, 6));
            assert_eq!(kind(&state, 5, 5), None);
            assert_eq!(kind(&state, 5, 6), Some(ShipKind::Fort));
        }

        #[test]
        fn minesweeper_clears_mine() {
            let (_config, _table, mut state) = layout(&[
                ship_at(5, 5, ShipKind::Minesweeper, Player::First),
                ship_at(5, 6, ShipKind::Mine, Player::Second),
            ]);
            attack(&mut state, Position::new(5, 5), Position::new(5, 6));
            assert_eq!(kind(&state, 5, 6), None);
            assert_eq!(kind(&state, 5, 5), Some(ShipKind::Minesweeper));
        }

        #[test]
        fn mine_takes_attacker_with_it() {
            let (_config, _table, mut state) = layout(&[
                ship_at(5, 5, ShipKind::Battleship, Player::First),
                ship_at(5, 6, ShipKind::Mine, Player::Second),
            ]);
            attack(&mut state, Position::new(5, 5), Position::new(5, 6));
            assert_eq!(kind(&state, 5, 5), None);
            assert_eq!(kind(&state, 5, 6), None);
        }

        #[test]
        fn attacked_nuke_detonates() {
            let (_config, _table, mut state) = layout(&[
                ship_at(5, 5, ShipKind::Cruiser, Player::First),
                ship_at(5, 6, ShipKind::NuclearBomb, Player::Second),
                ship_at(6, 7, ShipKind::Battleship, Player::Second),
                ship_at(5, 8, ShipKind::Battleship, Player::First),
            ]);
            attack(&mut state, Position::new(5, 5), Position::new(5, 6));
            assert_eq!(kind(&state, 5, 5), None);
            assert_eq!(kind(&state, 5, 6), None);
            assert_eq!(kind(&state, 6, 7), None);
            assert_eq!(kind(&state, 5, 8), Some(ShipKind::Battleship));
        }

        #[test]
        fn submarine_duel_is_immediate() {
            let (_config, _table, mut state) = layout(&[
                ship_at(5, 5, ShipKind::Submarine, Player::First),
                ship_at(5, 6, ShipKind::Battleship, Player::Second),
            ]);
            let cont = attack(&mut state, Position::new(5, 5), Position::new(5, 6));
            assert_eq!(cont, Continuation::FollowUp(Position::new(5, 5)));
            assert_eq!(kind(&state, 5, 6), None);
            assert!(state.pending().is_none());
        }

        #[test]
        fn destroyer_beats_submarine_by_reversed_duel() {
            let (_config, _table, mut state) = layout(&[
                ship_at(5, 5, ShipKind::Destroyer, Player::First),
                ship_at(5, 6, ShipKind::Submarine, Player::Second),
            ]);
            attack(&mut state, Position::new(5, 5), Position::new(5, 6));
            assert_eq!(kind(&state, 5, 6), None);
            assert_eq!(kind(&state, 5, 5), Some(ShipKind::Destroyer));
        }

        #[test]
        fn warships_wait_for_blocks() {
            let (_config, _table, mut state) = layout(&[
                ship_at(5, 5, ShipKind::Cruiser, Player::First),
                ship_at(5, 6, ShipKind::Destroyer, Player::Second),
            ]);
            let cont = attack(&mut state, Position::new(5, 5), Position::new(5, 6));

            assert_eq!(cont, Continuation::AwaitBlocks);
            let pending = state.pending().unwrap();
            assert_eq!(pending.from, Position::new(5, 5));
            assert_eq!(pending.to, Position::new(5, 6));
            let attacker = state.board().get(Position::new(5, 5)).unwrap();
            let defender = state.board().get(Position::new(5, 6)).unwrap();
            assert!(attacker.flags.contains(ShipFlags::ATTACKING));
            assert!(defender.flags.contains(ShipFlags::DEFENDING));
        }
    }
}
