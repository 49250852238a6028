use std::{sync::Arc, time::Duration};

use chess_core::TimeControl;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{
        RepoError,
        clock::ClockServiceImpl,
        game::{GameService, GameServiceImpl},
        invitation::InvitationServiceImpl,
        moves::MoveServiceImpl,
        ranking::RankingServiceImpl,
        result::ResultServiceImpl,
    },
    ports::{color::ColorPicker, persistence::GameRepository, rules::RulesEngine},
    processes::{
        clock_sweep_runner::ClockSweepJob,
        game_timeout_runner::{GameTimeoutRunner, GameTimeoutRunnerImpl},
    },
    workflow::{
        gameplay::{
            apply_move::{ApplyMoveUseCase, ApplyMoveUseCaseImpl},
            finish::{FinishGameUseCase, FinishGameUseCaseImpl},
            get::{GetGameUseCase, GetGameUseCaseImpl},
            list::{ListGamesUseCase, ListGamesUseCaseImpl},
            resign::{ResignUseCase, ResignUseCaseImpl},
            save_game::SaveGameWorkflowImpl,
            timeout::ObserveGameTimeoutUseCaseImpl,
        },
        invitation::{
            accept::{AcceptInvitationUseCase, AcceptInvitationUseCaseImpl},
            cleanup::InvitationCleanupJob,
            decline::{DeclineInvitationUseCase, DeclineInvitationUseCaseImpl},
            list::{ListInvitationsUseCase, ListInvitationsUseCaseImpl},
            send::{SendInvitationUseCase, SendInvitationUseCaseImpl},
        },
        ranking::{
            history::{GameHistoryUseCase, GameHistoryUseCaseImpl},
            rankings::{RankingsUseCase, RankingsUseCaseImpl},
        },
    },
};

pub mod domain;
pub mod ports;
pub mod processes;
pub mod workflow;

#[derive(Clone, Debug)]
pub struct SessionSettings {
    /// Assigned to every game created from now on.
    pub time_control: TimeControl,
    pub invitation_ttl: Duration,
    pub invitation_sweep_interval: Duration,
    pub clock_sweep_interval: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            time_control: TimeControl::default(),
            invitation_ttl: Duration::from_secs(24 * 60 * 60),
            invitation_sweep_interval: Duration::from_secs(60),
            clock_sweep_interval: Duration::from_secs(1),
        }
    }
}

pub struct Application {
    pub jobs: JoinHandle<()>,

    pub invitation_send_use_case: Box<dyn SendInvitationUseCase + Send + Sync + 'static>,
    pub invitation_accept_use_case: Box<dyn AcceptInvitationUseCase + Send + Sync + 'static>,
    pub invitation_decline_use_case: Box<dyn DeclineInvitationUseCase + Send + Sync + 'static>,
    pub invitation_list_use_case: Box<dyn ListInvitationsUseCase + Send + Sync + 'static>,

    pub game_apply_move_use_case: Box<dyn ApplyMoveUseCase + Send + Sync + 'static>,
    pub game_resign_use_case: Box<dyn ResignUseCase + Send + Sync + 'static>,
    pub game_finish_use_case: Box<dyn FinishGameUseCase + Send + Sync + 'static>,
    pub game_get_use_case: Box<dyn GetGameUseCase + Send + Sync + 'static>,
    pub game_list_use_case: Box<dyn ListGamesUseCase + Send + Sync + 'static>,

    pub history_use_case: Box<dyn GameHistoryUseCase + Send + Sync + 'static>,
    pub rankings_use_case: Box<dyn RankingsUseCase + Send + Sync + 'static>,
}

/// Wires the session manager. Stored games are restored first; background jobs run until
/// `shutdown` is cancelled.
pub async fn build_application<
    GR: GameRepository + Send + Sync + 'static,
    RE: RulesEngine + Send + Sync + 'static,
    CP: ColorPicker + Send + Sync + 'static,
>(
    game_repository: Arc<GR>,
    rules_engine: Arc<RE>,
    color_picker: Arc<CP>,
    settings: SessionSettings,
    shutdown: CancellationToken,
) -> Result<Application, RepoError> {
    let game_service = Arc::new(GameServiceImpl::new());
    let invitation_service = Arc::new(InvitationServiceImpl::new(settings.invitation_ttl));
    let clock_service = Arc::new(ClockServiceImpl::new(game_service.clone()));
    let move_service = Arc::new(MoveServiceImpl::new(game_service.clone(), rules_engine));
    let result_service = Arc::new(ResultServiceImpl::new(game_service.clone()));
    let ranking_service = Arc::new(RankingServiceImpl);

    let save_game_workflow = Arc::new(SaveGameWorkflowImpl::new(game_repository.clone()));
    let observe_game_timeout_use_case = Arc::new(ObserveGameTimeoutUseCaseImpl::new(
        clock_service.clone(),
        save_game_workflow.clone(),
    ));
    let game_timeout_runner = Arc::new(GameTimeoutRunnerImpl::new(
        observe_game_timeout_use_case.clone(),
        shutdown.clone(),
    ));

    let stored_games = game_repository.load_games().await?;
    let restored = game_service.restore_games(stored_games);
    let active_game_ids = game_service.active_game_ids();
    log::info!(
        "Restored {} games, {} still active",
        restored,
        active_game_ids.len()
    );
    for game_id in active_game_ids {
        GameTimeoutRunner::schedule_game_timeout_check(game_timeout_runner.clone(), game_id);
    }

    let clock_sweep_job = ClockSweepJob::new(
        observe_game_timeout_use_case.clone(),
        settings.clock_sweep_interval,
        shutdown.clone(),
    );
    let invitation_cleanup_job = InvitationCleanupJob::new(
        invitation_service.clone(),
        settings.invitation_sweep_interval,
        shutdown.clone(),
    );

    let jobs = tokio::spawn(async move {
        futures::join!(clock_sweep_job.run(), invitation_cleanup_job.run());
    });

    let application = Application {
        jobs,

        invitation_send_use_case: Box::new(SendInvitationUseCaseImpl::new(
            invitation_service.clone(),
        )),
        invitation_accept_use_case: Box::new(AcceptInvitationUseCaseImpl::new(
            invitation_service.clone(),
            game_service.clone(),
            color_picker,
            save_game_workflow.clone(),
            game_timeout_runner.clone(),
            settings.time_control.clone(),
        )),
        invitation_decline_use_case: Box::new(DeclineInvitationUseCaseImpl::new(
            invitation_service.clone(),
        )),
        invitation_list_use_case: Box::new(ListInvitationsUseCaseImpl::new(
            invitation_service.clone(),
        )),

        game_apply_move_use_case: Box::new(ApplyMoveUseCaseImpl::new(
            move_service.clone(),
            save_game_workflow.clone(),
        )),
        game_resign_use_case: Box::new(ResignUseCaseImpl::new(
            result_service.clone(),
            save_game_workflow.clone(),
        )),
        game_finish_use_case: Box::new(FinishGameUseCaseImpl::new(
            result_service.clone(),
            save_game_workflow.clone(),
        )),
        game_get_use_case: Box::new(GetGameUseCaseImpl::new(
            clock_service.clone(),
            save_game_workflow.clone(),
        )),
        game_list_use_case: Box::new(ListGamesUseCaseImpl::new(
            game_service.clone(),
            clock_service.clone(),
            save_game_workflow.clone(),
        )),

        history_use_case: Box::new(GameHistoryUseCaseImpl::new(
            game_service.clone(),
            ranking_service.clone(),
        )),
        rankings_use_case: Box::new(RankingsUseCaseImpl::new(
            game_service.clone(),
            ranking_service.clone(),
        )),
    };

    Ok(application)
}
