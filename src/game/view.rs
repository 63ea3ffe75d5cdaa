//! Widgets bound to a game: number, turn indicator, players, board and the
//! finished overlay.

use std::sync::{Arc, Mutex, MutexGuard};

use tictactoe_board::{Cell, Position, Side};
use tracing::{debug, instrument, warn};

use super::{GameMetaData, TicTacToeGame, should_celebrate};
use crate::router::App;
use crate::view::{Action, NodeId, Screen, Widget, WidgetKind};

#[derive(Debug, Default)]
struct ViewNodes {
    game_number: Option<NodeId>,
    status: Option<NodeId>,
    players: Option<NodeId>,
    player_infos: Option<[NodeId; 2]>,
    cells: [Option<NodeId>; 9],
    overlay: Option<NodeId>,
}

#[derive(Debug)]
struct ViewInner {
    screen: Screen,
    nodes: Mutex<ViewNodes>,
}

/// Game widgets on one screen.
///
/// Every write goes through the [`Screen`] it was mounted on, so updates
/// arriving after the user left the page change nothing.
#[derive(Debug, Clone)]
pub struct GameView {
    inner: Arc<ViewInner>,
}

fn cell_widget(position: Position, cell: Cell, action: Action, disabled: bool) -> Widget {
    let (x, y) = position.coords();
    let mut widget = Widget::new(WidgetKind::Cell { x, y })
        .class("gameTile")
        .with_action(action);
    if let Cell::Occupied(side) = cell {
        widget = widget.with_text(side.icon()).class("occupied");
    }
    if disabled {
        widget = widget.class("disabled");
    }
    widget
}

fn player_info(identity: Option<&str>, side: Side, automated_opponent: &str, next: Option<Side>) -> Widget {
    let is_bot = identity == Some(automated_opponent);
    let name = match identity {
        Some(name) => format!("@{}", name),
        None => "Guest".to_string(),
    };
    let mut widget = Widget::row([
        Widget::icon(side.icon()).class("playerSign"),
        Widget::icon(if is_bot { "bot" } else { "person" }).class("playerIcon"),
        Widget::text(name).class("playerName"),
    ])
    .class("playerInfo");
    if next == Some(side) {
        widget = widget.class("myTurn");
    }
    widget
}

fn outcome_text(metadata: &GameMetaData) -> String {
    if metadata.game_state.draw {
        return "Draw!".to_string();
    }
    match metadata.winner() {
        Some(tictactoe_board::GUEST) => "Guest wins!".to_string(),
        Some(winner) => format!("@{} wins!", winner),
        None => "Game over".to_string(),
    }
}

impl GameView {
    /// Adds placeholder widgets for a game to `screen`.
    #[instrument(skip_all, fields(generation = screen.generation()))]
    pub fn mount(screen: &Screen) -> Self {
        let mut nodes = ViewNodes::default();
        if let Some(info) = screen.add(Widget::row([]).class("gameInfo")) {
            nodes.game_number =
                screen.add_to(Some(info), Widget::text("#…").class("gameNumberContainer"));
            nodes.status =
                screen.add_to(Some(info), Widget::text("connecting…").class("gameStateContainer"));
        }
        nodes.players = screen.add(Widget::row([]).class("gamePlayerInfo"));
        if let Some(board) = screen.add(Widget::column([]).class("gameContainer")) {
            for y in 0..3 {
                let Some(row) = screen.add_to(Some(board), Widget::row([]).class("gameRow")) else {
                    break;
                };
                for x in 0..3 {
                    let Some(position) = Position::from_coords(x, y) else {
                        continue;
                    };
                    let placeholder = cell_widget(position, Cell::Empty, Action::Disabled, false)
                        .class("loading");
                    nodes.cells[position.to_index()] = screen.add_to(Some(row), placeholder);
                }
            }
        }
        nodes.overlay = screen.add(Widget::container([]).class("gameOverlay"));
        Self {
            inner: Arc::new(ViewInner {
                screen: screen.clone(),
                nodes: Mutex::new(nodes),
            }),
        }
    }

    fn nodes(&self) -> MutexGuard<'_, ViewNodes> {
        self.inner.nodes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// False once the screen was replaced.
    pub fn is_attached(&self) -> bool {
        self.inner.screen.is_attached()
    }

    /// Shows which game this is.
    pub fn bind(&self, game: &TicTacToeGame) {
        let Some(node) = self.nodes().game_number else {
            return;
        };
        let link = Widget::link(
            format!("#{}", game.game_id()),
            Action::NavigateToUrl(format!("/games/{}", game.game_id())),
        )
        .class("gameNumberContainer");
        self.inner.screen.replace(node, link);
    }

    /// Redraws everything from the game's current state.
    #[instrument(skip_all, fields(game_id = %game.game_id()))]
    pub fn update(&self, game: &TicTacToeGame) {
        if !self.is_attached() {
            debug!("Game view detached, skipping update");
            return;
        }
        let app = game.app();
        let metadata = game.metadata();
        let finished = game.is_finished();
        let next = game.next_mover();
        let playable = game.may_play() && !finished;

        let status = if !game.may_play() {
            "observer"
        } else if finished {
            "game over"
        } else if game.is_my_turn() {
            "your turn"
        } else {
            "opponents turn"
        };

        let mut nodes = self.nodes();
        let screen = &self.inner.screen;
        if let Some(node) = nodes.status {
            screen.replace(node, Widget::text(status).class("gameStateContainer"));
        }

        if let Some(meta) = &metadata {
            self.update_players(&mut nodes, meta, app.automated_opponent(), next);
        }

        let board = game.board();
        for (position, cell) in board.cells() {
            let Some(node) = nodes.cells[position.to_index()] else {
                continue;
            };
            let action = if playable {
                cell_click(app, game.game_id(), position)
            } else {
                Action::Disabled
            };
            screen.replace(node, cell_widget(position, cell, action, finished));
        }

        let finished_meta = metadata.as_ref().filter(|m| m.is_finished());
        if let (Some(node), Some(meta)) = (nodes.overlay, finished_meta) {
            let mut children = vec![Widget::heading(2, outcome_text(meta))];
            if should_celebrate(meta, app.credentials().as_ref()) {
                children.push(Widget::text("You won!").class("celebration"));
            }
            children.push(Widget::button(
                "New game",
                Action::NavigateToUrl("/games/new".to_string()),
            ));
            screen.replace(node, Widget::container(children).class("gameOverlay").class("visible"));
        }
    }

    /// Builds the player panel the first time metadata is known, then only
    /// moves the turn highlight.
    fn update_players(
        &self,
        nodes: &mut ViewNodes,
        meta: &GameMetaData,
        automated_opponent: &str,
        next: Option<Side>,
    ) {
        let screen = &self.inner.screen;
        let info = |side: Side| {
            player_info(meta.players.identity(side), side, automated_opponent, next)
        };
        match nodes.player_infos {
            Some([attacker, defender]) => {
                screen.replace(attacker, info(Side::Attacker));
                screen.replace(defender, info(Side::Defender));
            }
            None => {
                let Some(panel) = nodes.players else {
                    return;
                };
                let attacker = screen.add_to(Some(panel), info(Side::Attacker));
                screen.add_to(Some(panel), Widget::text("vs.").class("vs"));
                let defender = screen.add_to(Some(panel), info(Side::Defender));
                match (attacker, defender) {
                    (Some(a), Some(d)) => nodes.player_infos = Some([a, d]),
                    _ => warn!("Player panel could not be built"),
                }
            }
        }
    }
}

/// Click on a cell: finds the game in the arena by id and plays there.
fn cell_click(app: &App, game_id: &str, position: Position) -> Action {
    let app = app.clone();
    let game_id = game_id.to_string();
    let (x, y) = position.coords();
    Action::invoke(move || {
        let app = app.clone();
        let game_id = game_id.clone();
        async move {
            match app.game(&game_id) {
                Some(game) => {
                    game.attempt_move(x, y).await;
                }
                None => warn!(game_id = %game_id, "Click on a game that is not loaded"),
            }
        }
    })
}
