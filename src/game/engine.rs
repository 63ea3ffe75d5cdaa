//! One game's board, kept in step with the server.
//!
//! The server owns the move list. The engine replays it into a [`Board`],
//! applies the local player's move optimistically, commits it and then
//! refreshes; the refreshed board always supersedes the optimistic one.

use std::sync::{Arc, Mutex, MutexGuard};

use derive_more::{Display, Error};
use futures::FutureExt;
use futures::future::BoxFuture;
use tictactoe_board::{Board, Cell, Move, Position, Side, last_move, next_mover};
use tracing::{debug, info, instrument, warn};

use super::{GameMetaData, GameView};
use crate::api::{Form, GameSnapshot, NewGame, paths};
use crate::auth::Authenticator;
use crate::router::{App, ErrorOptions};
use crate::view::Callback;

/// Why a move was refused locally, before any request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveRejection {
    /// No authenticator is bound.
    #[display("invalid move: you are only watching this game")]
    Observer,
    /// The game is over.
    #[display("invalid move: the game is finished")]
    Finished,
    /// The target cell holds a mark.
    #[display("invalid move: field is occupied")]
    Occupied,
    /// The last move was not the opponent's.
    #[display("invalid move: it is not your turn")]
    NotYourTurn,
    /// Coordinates outside the 3×3 board.
    #[display("invalid move: outside the board")]
    OffBoard,
}

#[derive(Debug, Default)]
struct GameData {
    moves: Vec<Move>,
    board: Board,
    metadata: Option<GameMetaData>,
}

#[derive(Debug)]
struct GameInner {
    game_id: String,
    app: App,
    authenticator: Option<Authenticator>,
    view: Option<GameView>,
    data: Mutex<GameData>,
}

/// Handle to one game; clones share the same state.
#[derive(Debug, Clone)]
pub struct TicTacToeGame {
    inner: Arc<GameInner>,
}

impl TicTacToeGame {
    /// Asks the server for a new game and attaches to it.
    ///
    /// Signed-in users play as themselves; guests play with the game key
    /// the server hands out. On failure an error banner offers a retry of
    /// the whole allocation.
    pub fn create_new(app: App, view: Option<GameView>) -> BoxFuture<'static, Option<Self>> {
        async move {
            let response = app.api(paths::START_NEW_GAME, Form::new(), true).await;
            let new_game = match response.data_as::<NewGame>() {
                Ok(new_game) => new_game,
                Err(e) => {
                    warn!(error = %e, "Game allocation failed");
                    if view.as_ref().is_none_or(GameView::is_attached) {
                        let retry_app = app.clone();
                        let retry_view = view.clone();
                        app.show_error(
                            "A new game could not be created.",
                            ErrorOptions::retry_with(Callback::new(move || {
                                let app = retry_app.clone();
                                let view = retry_view.clone();
                                async move {
                                    Self::create_new(app, view).await;
                                }
                            })),
                        );
                    }
                    return None;
                }
            };

            let authenticator = match (app.credentials(), new_game.game_key) {
                (Some(credentials), _) => Some(Authenticator::from_credentials(&credentials)),
                (None, Some(key)) => Some(Authenticator::from_game_key(key)),
                (None, None) => {
                    warn!(game_id = %new_game.game_id, "Guest game without a key, observing only");
                    None
                }
            };
            if let Some(authenticator) = &authenticator {
                app.remember_authenticator(&new_game.game_id, authenticator.clone());
            }
            info!(game_id = %new_game.game_id, "Game allocated");
            Some(Self::attach(app, new_game.game_id, authenticator, view).await)
        }
        .boxed()
    }

    /// Binds to an existing game and loads it.
    ///
    /// Without an authenticator the game is observed read-only.
    #[instrument(skip(app, authenticator, view), fields(playing = authenticator.is_some()))]
    pub async fn attach(
        app: App,
        game_id: String,
        authenticator: Option<Authenticator>,
        view: Option<GameView>,
    ) -> Self {
        let game = Self {
            inner: Arc::new(GameInner {
                game_id,
                app: app.clone(),
                authenticator,
                view,
                data: Mutex::new(GameData::default()),
            }),
        };
        app.insert_game(game.clone());
        if let Some(view) = game.view() {
            view.bind(&game);
        }
        game.refresh().await;
        game
    }

    fn data(&self) -> MutexGuard<'_, GameData> {
        self.inner.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// True once the screen this engine drew on was replaced.
    pub fn is_detached(&self) -> bool {
        self.view().is_some_and(|v| !v.is_attached())
    }

    fn view(&self) -> Option<&GameView> {
        self.inner.view.as_ref()
    }

    fn update_view(&self) {
        if let Some(view) = self.view() {
            view.update(self);
        }
    }

    fn report(&self, text: &str, options: ErrorOptions) {
        if self.is_detached() {
            debug!(text, "Game screen is gone, dropping banner");
            return;
        }
        self.inner.app.show_error(text, options);
    }

    /// Server-side identity of the game.
    pub fn game_id(&self) -> &str {
        &self.inner.game_id
    }

    /// Application context the game talks through.
    pub fn app(&self) -> &App {
        &self.inner.app
    }

    /// How moves are credentialed; `None` when observing.
    pub fn authenticator(&self) -> Option<&Authenticator> {
        self.inner.authenticator.as_ref()
    }

    /// Current board, including an unconfirmed local move.
    pub fn board(&self) -> Board {
        self.data().board
    }

    /// Known moves, including an unconfirmed local move.
    pub fn moves(&self) -> Vec<Move> {
        self.data().moves.clone()
    }

    /// Metadata of the last successful refresh.
    pub fn metadata(&self) -> Option<GameMetaData> {
        self.data().metadata.clone()
    }

    /// True once the server reported the game finished.
    pub fn is_finished(&self) -> bool {
        self.data()
            .metadata
            .as_ref()
            .is_some_and(GameMetaData::is_finished)
    }

    /// Side whose turn it is; `None` once finished.
    pub fn next_mover(&self) -> Option<Side> {
        let data = self.data();
        let finished = data.metadata.as_ref().is_some_and(GameMetaData::is_finished);
        next_mover(&data.moves, finished, self.inner.app.automated_opponent())
    }

    /// Side the local player moves for.
    pub fn my_side(&self) -> Option<Side> {
        self.authenticator()
            .map(|a| Side::classify(a.player_identity(), self.inner.app.automated_opponent()))
    }

    /// Whether the local player may move now.
    pub fn is_my_turn(&self) -> bool {
        self.may_play() && self.my_side().is_some_and(|side| self.next_mover() == Some(side))
    }

    /// Whether the local player takes part in this game.
    ///
    /// A signed-in member opening someone else's game only watches.
    pub fn may_play(&self) -> bool {
        match self.authenticator() {
            None => false,
            Some(Authenticator::GameKey(_)) => true,
            Some(Authenticator::Member { username }) => match &self.data().metadata {
                Some(meta) => meta.players.attacker.as_deref() == Some(username.as_str()),
                None => true,
            },
        }
    }

    /// Fetches moves and metadata and redraws.
    ///
    /// Calling it again without new moves changes nothing. On failure an
    /// error banner offers a retry.
    pub fn refresh(&self) -> BoxFuture<'static, bool> {
        let game = self.clone();
        async move {
            let form = Form::new().field("gameId", game.game_id());
            let response = game.inner.app.api(paths::VIEW_GAME, form, false).await;
            match response.data_as::<GameSnapshot>() {
                Ok(snapshot) => {
                    {
                        let mut data = game.data();
                        data.board =
                            Board::replay(&snapshot.moves, game.inner.app.automated_opponent());
                        data.moves = snapshot.moves;
                        data.metadata =
                            Some(GameMetaData::new(snapshot.players, snapshot.game_state));
                        debug!(
                            game_id = %game.game_id(),
                            moves = data.moves.len(),
                            "Game refreshed"
                        );
                    }
                    game.update_view();
                    true
                }
                Err(e) => {
                    warn!(game_id = %game.game_id(), error = %e, "Refresh failed");
                    let retry = game.clone();
                    game.report(
                        "Game data could not be refreshed.",
                        ErrorOptions::retry_with(Callback::new(move || {
                            let game = retry.clone();
                            async move {
                                game.refresh().await;
                            }
                        })),
                    );
                    false
                }
            }
        }
        .boxed()
    }

    /// Checks a move at `(x, y)` against the local board and, if legal,
    /// records it there before any request.
    ///
    /// The check sees earlier optimistic writes, so a second click on the
    /// same cell is refused without reaching the server.
    #[instrument(skip(self), fields(game_id = %self.inner.game_id))]
    pub fn place_optimistic(&self, x: usize, y: usize) -> Result<Move, MoveRejection> {
        let Some(authenticator) = self.authenticator() else {
            return Err(MoveRejection::Observer);
        };
        if !self.may_play() {
            return Err(MoveRejection::Observer);
        }
        let position = Position::from_coords(x, y).ok_or(MoveRejection::OffBoard)?;
        let bot = self.inner.app.automated_opponent();

        let mut data = self.data();
        if data.metadata.as_ref().is_some_and(GameMetaData::is_finished) {
            return Err(MoveRejection::Finished);
        }
        if !data.board.is_empty(position) {
            return Err(MoveRejection::Occupied);
        }
        let last = last_move(&data.moves);
        if last.is_some_and(|m| m.side(bot) != Side::Defender) {
            return Err(MoveRejection::NotYourTurn);
        }

        let mv = Move {
            game_id: self.inner.game_id.clone(),
            move_index: last.map_or(0, |m| m.move_index + 1),
            move_position: position,
            player: authenticator.player_identity().to_string(),
        };
        data.board.set(position, Cell::Occupied(mv.side(bot)));
        data.moves.push(mv.clone());
        debug!(position = %position, move_index = mv.move_index, "Optimistic move applied");
        Ok(mv)
    }

    /// Plays at `(x, y)`.
    ///
    /// Returns false without contacting the server when the move is illegal
    /// locally, after showing why. Otherwise the board updates at once and
    /// the move is committed and reconciled.
    #[instrument(skip(self), fields(game_id = %self.inner.game_id))]
    pub async fn attempt_move(&self, x: usize, y: usize) -> bool {
        match self.place_optimistic(x, y) {
            Ok(mv) => {
                info!(x, y, "Move");
                self.update_view();
                self.commit(mv.move_position).await;
                true
            }
            Err(rejection) => {
                debug!(%rejection, "Move refused locally");
                self.report(&rejection.to_string(), ErrorOptions::acknowledge());
                false
            }
        }
    }

    /// Sends the move at `position` and reconciles.
    ///
    /// On failure the optimistic mark stays; the banner offers a retry and a
    /// cancel that rolls back to the server's board.
    pub fn commit(&self, position: Position) -> BoxFuture<'static, bool> {
        let game = self.clone();
        async move {
            let Some(authenticator) = game.authenticator().cloned() else {
                return false;
            };
            let form = Form::new()
                .field("gameId", game.game_id())
                .field("movePosition", position.to_index());
            let response = game
                .inner
                .app
                .api_as(&authenticator, paths::MAKE_MOVE, form)
                .await;
            if response.success {
                game.refresh().await;
                return true;
            }

            warn!(
                game_id = %game.game_id(),
                error = %response.error_message(),
                "Commit failed"
            );
            let retry = game.clone();
            let cancel = game.clone();
            game.report(
                "Failed to commit move to server.",
                ErrorOptions::default()
                    .with_retry(Callback::new(move || {
                        let game = retry.clone();
                        async move {
                            game.retry_commit(position).await;
                        }
                    }))
                    .with_cancel(Callback::new(move || {
                        let game = cancel.clone();
                        async move {
                            game.refresh().await;
                        }
                    })),
            );
            false
        }
        .boxed()
    }

    /// Retries a failed commit without sending a move twice.
    ///
    /// Refreshes first: if the server already holds a move on `position`,
    /// the earlier request went through and nothing is sent.
    pub fn retry_commit(&self, position: Position) -> BoxFuture<'static, bool> {
        let game = self.clone();
        async move {
            if !game.refresh().await {
                return false;
            }
            let recorded = game
                .moves()
                .iter()
                .any(|m| m.move_position == position);
            if recorded {
                info!(position = %position, "Move already recorded, not resending");
                return true;
            }
            let (x, y) = position.coords();
            match game.place_optimistic(x, y) {
                Ok(_) => {
                    game.update_view();
                    game.commit(position).await
                }
                Err(rejection) => {
                    game.report(&rejection.to_string(), ErrorOptions::acknowledge());
                    false
                }
            }
        }
        .boxed()
    }
}
