//! Signed-in identity plus the bearer token behind it.
//!
//! Listeners registered with [`Session::subscribe`] hear about every
//! sign-in and sign-out, mirroring an auth provider's state-change
//! callback. The session is single-threaded, like the UIs that own it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::model::CurrentUser;
use crate::settings::PreferenceStore;

pub const TOKEN_KEY: &str = "board_token";

type Listener = Rc<dyn Fn(Option<&CurrentUser>)>;

#[derive(Default)]
struct State {
    token: Option<String>,
    user: Option<CurrentUser>,
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct Session {
    state: Rc<RefCell<State>>,
    prefs: Option<Rc<dyn PreferenceStore>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Session")
            .field("user", &state.user)
            .field("has_token", &state.token.is_some())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose token survives restarts through `prefs`. The identity
    /// is unknown until [`crate::AuthClient::restore`] asks the backend.
    pub fn persistent(prefs: Rc<dyn PreferenceStore>) -> Self {
        let token = prefs.get(TOKEN_KEY).filter(|t| !t.is_empty());
        Self {
            state: Rc::new(RefCell::new(State {
                token,
                ..State::default()
            })),
            prefs: Some(prefs),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state.borrow().user.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().user.is_some()
    }

    pub fn establish(&self, token: String, user: CurrentUser) {
        self.persist(Some(&token));
        {
            let mut state = self.state.borrow_mut();
            state.token = Some(token);
            state.user = Some(user);
        }
        self.notify();
    }

    /// Records the identity behind an already stored token.
    pub fn resume(&self, user: CurrentUser) {
        self.state.borrow_mut().user = Some(user);
        self.notify();
    }

    pub fn clear(&self) {
        self.persist(None);
        let was_signed_in = {
            let mut state = self.state.borrow_mut();
            state.token = None;
            state.user.take().is_some()
        };
        if was_signed_in {
            self.notify();
        }
    }

    /// Registers `listener` and calls it once with the current identity.
    /// Dropping the returned handle unsubscribes.
    pub fn subscribe(&self, listener: impl Fn(Option<&CurrentUser>) + 'static) -> Subscription {
        let listener: Listener = Rc::new(listener);
        let (id, user) = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.listeners.push((id, Rc::clone(&listener)));
            (id, state.user.clone())
        };
        listener(user.as_ref());
        Subscription {
            state: Rc::downgrade(&self.state),
            id,
        }
    }

    fn notify(&self) {
        // listeners may read the session again, so call them unborrowed
        let (user, listeners): (_, Vec<Listener>) = {
            let state = self.state.borrow();
            (
                state.user.clone(),
                state.listeners.iter().map(|(_, l)| Rc::clone(l)).collect(),
            )
        };
        for listener in listeners {
            listener(user.as_ref());
        }
    }

    fn persist(&self, token: Option<&str>) {
        let Some(prefs) = &self.prefs else {
            return;
        };
        let result = match token {
            Some(token) => prefs.set(TOKEN_KEY, token),
            None => prefs.remove(TOKEN_KEY),
        };
        if let Err(err) = result {
            warn!(%err, "failed to persist session token");
        }
    }
}

#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    state: Weak<RefCell<State>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
