//! Game view.
//!
//! One page wired to the round host. Layout polish is intentionally thin;
//! the view's job is to surface the round snapshot and forward commands.

use crate::host::RoundHost;
use std::rc::Rc;
use tunequest_engine::{
    HintKey, LevelId, LoadFailureKind, PlayMode, Remediation, RoundNote, RoundPhase, RoundSession,
};
use web_sys::HtmlInputElement;
use yew::prelude::*;

fn hint_label(key: HintKey) -> &'static str {
    match key {
        HintKey::Year => "Year",
        HintKey::Genre => "Genre",
        HintKey::Album => "Album",
        HintKey::Artist => "Artist",
        HintKey::TitleTeaser => "Title starts with",
    }
}

fn note_text(note: &RoundNote) -> String {
    match note {
        RoundNote::EmptyGuess => String::from("Type an answer first."),
        RoundNote::WrongGuess { hint: Some(key) } => {
            format!("Not it — new hint unlocked: {}.", hint_label(*key))
        }
        RoundNote::WrongGuess { hint: None } => String::from("Not it — listen again."),
        RoundNote::JudgeUnreachable => {
            String::from("Couldn't check your answer. That try doesn't count — submit again.")
        }
        RoundNote::PlaybackBlocked => {
            String::from("Your browser blocked autoplay. Tap play to listen.")
        }
        RoundNote::PlaybackFormat(reason) => format!("This track can't be played: {reason}"),
        RoundNote::PlaybackFailed(reason) => format!("Playback failed: {reason}"),
    }
}

fn failure_text(kind: LoadFailureKind) -> &'static str {
    match kind.remediation() {
        Remediation::LinkMusicAccount => {
            "This level needs a linked music account. Connect one from your profile."
        }
        Remediation::Register => "This level is for registered players. Create an account to play.",
        Remediation::Reauthenticate => "Your session expired. Log in again to keep playing.",
        Remediation::Retry => "The level couldn't be loaded.",
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct GameProps {
    #[prop_or(1)]
    pub level_number: u32,
}

#[function_component(GamePage)]
pub fn game_page(props: &GameProps) -> Html {
    let update = use_force_update();
    let host_slot = use_mut_ref(|| None::<Rc<RoundHost>>);
    let guess_ref = use_node_ref();

    {
        let host_slot = host_slot.clone();
        use_effect_with(props.level_number, move |level| {
            let mode = PlayMode::from_token(crate::dom::auth_token());
            let level_id = LevelId::for_mode(*level, &mode);
            let host = RoundHost::begin(
                level_id,
                mode,
                Callback::from(move |()| update.force_update()),
            );
            *host_slot.borrow_mut() = Some(Rc::clone(&host));
            move || host.teardown()
        });
    }

    let Some(host) = host_slot.borrow().as_ref().cloned() else {
        return html! { <main class="game"><p>{ "Loading level…" }</p></main> };
    };
    let round = host.with_round(RoundSession::clone);

    let on_start = {
        let host = Rc::clone(&host);
        Callback::from(move |_: MouseEvent| host.start())
    };
    let on_replay = {
        let host = Rc::clone(&host);
        Callback::from(move |_: MouseEvent| host.replay())
    };
    let on_give_up = {
        let host = Rc::clone(&host);
        Callback::from(move |_: MouseEvent| host.give_up())
    };
    let on_retry = {
        let host = Rc::clone(&host);
        Callback::from(move |_: MouseEvent| host.retry())
    };
    let on_restart = {
        let host = Rc::clone(&host);
        Callback::from(move |_: MouseEvent| host.restart())
    };
    let on_next_level = {
        let host = Rc::clone(&host);
        Callback::from(move |_: MouseEvent| host.advance_level())
    };
    let on_submit = {
        let host = Rc::clone(&host);
        let guess_ref = guess_ref.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            if let Some(input) = guess_ref.cast::<HtmlInputElement>() {
                host.submit(&input.value());
                input.set_value("");
            }
        })
    };

    let note = round.note().map(note_text);
    let body = match round.phase() {
        RoundPhase::Loading => html! { <p>{ "Loading level…" }</p> },
        RoundPhase::Vacant => html! { <p>{ "This level has no song yet. Check back later." }</p> },
        RoundPhase::LoadError(kind) => html! {
            <div class="load-error">
                <p>{ failure_text(*kind) }</p>
                <button onclick={on_retry}>{ "Try again" }</button>
            </div>
        },
        RoundPhase::Ready => html! {
            <div class="round-ready">
                { render_cover(&round) }
                <button class="play" onclick={on_start}>{ "Tap to play" }</button>
                <button onclick={on_give_up}>{ "Give up" }</button>
            </div>
        },
        RoundPhase::Listening => html! {
            <div class="round-live">
                { render_cover(&round) }
                <p class="listening">{ format!("Listening… {}s snippet", round.window_secs()) }</p>
                { render_hints(&round) }
                <button onclick={on_give_up}>{ "Give up" }</button>
            </div>
        },
        RoundPhase::AwaitingAnswer | RoundPhase::Evaluating => {
            let evaluating = *round.phase() == RoundPhase::Evaluating;
            html! {
                <div class="round-live">
                    { render_cover(&round) }
                    <p>{ format!("Attempt {} of {}", round.attempt(), round.max_attempts()) }</p>
                    { render_hints(&round) }
                    <form onsubmit={on_submit}>
                        <input
                            ref={guess_ref.clone()}
                            placeholder="Name that song"
                            disabled={evaluating}
                        />
                        <button type="submit" disabled={evaluating}>{ "Guess" }</button>
                    </form>
                    <button onclick={on_replay} disabled={!round.replay_allowed() || evaluating}>
                        { format!("Replay {}s", round.window_secs()) }
                    </button>
                    <button onclick={on_give_up} disabled={evaluating}>{ "Give up" }</button>
                </div>
            }
        }
        RoundPhase::Correct | RoundPhase::Exhausted | RoundPhase::GivenUp => {
            render_terminal(&round, on_restart, on_next_level)
        }
    };

    html! {
        <main class="game">
            <h1>{ format!("Level {}", props.level_number) }</h1>
            { body }
            if let Some(text) = note {
                <p class="note">{ text }</p>
            }
        </main>
    }
}

fn render_cover(round: &RoundSession) -> Html {
    let Some(puzzle) = round.puzzle() else {
        return Html::default();
    };
    let class = format!("cover cover-q{}", round.cover_quarters());
    html! { <img class={class} src={puzzle.cover_url().to_string()} alt="Album cover" /> }
}

fn render_hints(round: &RoundSession) -> Html {
    let Some(puzzle) = round.puzzle() else {
        return Html::default();
    };
    if round.revealed_hints().is_empty() {
        return Html::default();
    }
    html! {
        <ul class="hints">
            { for round.revealed_hints().iter().map(|key| html! {
                <li>
                    <span class="hint-label">{ hint_label(*key) }</span>
                    { ": " }
                    <span class="hint-value">{ puzzle.hint_value(*key) }</span>
                </li>
            }) }
        </ul>
    }
}

fn render_terminal(
    round: &RoundSession,
    on_restart: Callback<MouseEvent>,
    on_next_level: Callback<MouseEvent>,
) -> Html {
    let headline = match round.phase() {
        RoundPhase::Correct => format!("Correct! You scored {} points.", round.score()),
        RoundPhase::Exhausted => String::from("Out of attempts."),
        RoundPhase::GivenUp => String::from("You gave up."),
        _ => String::new(),
    };
    let answer = round.puzzle().and_then(|puzzle| {
        puzzle
            .answer()
            .map(|fields| format!("The song was \"{}\" by {}.", fields.title, fields.performer))
    });
    html! {
        <div class="round-over">
            <p class="headline">{ headline }</p>
            if let Some(text) = answer {
                <p class="answer">{ text }</p>
            }
            <button onclick={on_restart}>{ "Play again" }</button>
            <button onclick={on_next_level}>{ "Next level" }</button>
        </div>
    }
}

#[function_component(App)]
pub fn app() -> Html {
    html! { <GamePage level_number={1} /> }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use yew::LocalServerRenderer;

    #[test]
    fn page_renders_loading_shell_before_the_host_exists() {
        let html = block_on(LocalServerRenderer::<App>::new().render());
        assert!(html.contains("Loading level"));
    }

    #[test]
    fn hint_labels_cover_every_key() {
        for key in [
            HintKey::Year,
            HintKey::Genre,
            HintKey::Album,
            HintKey::Artist,
            HintKey::TitleTeaser,
        ] {
            assert!(!hint_label(key).is_empty());
        }
    }

    #[test]
    fn notes_read_as_player_messages() {
        assert!(note_text(&RoundNote::EmptyGuess).contains("answer"));
        assert!(
            note_text(&RoundNote::WrongGuess {
                hint: Some(HintKey::Year)
            })
            .contains("Year")
        );
        assert!(note_text(&RoundNote::JudgeUnreachable).contains("doesn't count"));
        assert!(note_text(&RoundNote::PlaybackBlocked).contains("Tap play"));
    }

    #[test]
    fn failure_text_matches_remediation() {
        assert!(failure_text(LoadFailureKind::NeedsLink).contains("linked music account"));
        assert!(failure_text(LoadFailureKind::NeedsUpgrade).contains("account"));
        assert!(failure_text(LoadFailureKind::Unauthenticated).contains("Log in"));
        assert!(failure_text(LoadFailureKind::Network).contains("couldn't be loaded"));
    }
}
