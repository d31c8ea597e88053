use std::rc::Rc;

use board_client::comments::{post_comment, remove_comment, CommentThread, DeleteOutcome};
use board_client::messages;
use board_client::model::short_date;
use board_client::posts::{delete_post, open_post, publish_post};
use board_client::validation::{
    message_for, validate_comment, validate_login, validate_registration, FieldError,
};
use board_client::{
    display_label, is_owner, load_edit_gate, save_edit, AppSettings, AuthClient, BoardStore,
    Comment, CurrentUser, EditGate, Paginator, Post, PostDraft, SaveError, Session, Theme,
    POSTS_PER_PAGE,
};
use client::{BoardClientWeb, LocalStoragePreferences};
use dioxus::prelude::*;
use tracing::warn;

mod client;
mod error;

const BASE_URL: &str = "http://127.0.0.1:8080";

#[derive(Clone, Routable, Debug, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Header)]
        #[route("/")]
        BoardList {},
        #[route("/post/:id")]
        PostDetail { id: String },
        #[route("/write")]
        PostWrite {},
        #[route("/edit/:id")]
        PostEdit { id: String },
        #[route("/login")]
        Login {},
        #[route("/register")]
        Register {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

type Identity = Signal<Option<CurrentUser>>;

fn main() {
    tracing_wasm::set_as_global_default();
    dioxus::launch(App);
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

fn apply_theme(theme: Theme) {
    let Some(root) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.document_element())
    else {
        return;
    };
    if let Err(err) = root
        .class_list()
        .toggle_with_force("dark", theme == Theme::Dark)
    {
        warn!(?err, "failed to apply theme");
    }
}

#[component]
fn App() -> Element {
    let client = use_context_provider(|| {
        let session = Session::persistent(Rc::new(LocalStoragePreferences));
        BoardClientWeb::new(BASE_URL, session)
    });

    let identity: Identity = use_signal(|| None);
    use_context_provider(|| identity);

    // mirrors every sign-in and sign-out into the identity signal
    let _subscription = use_hook(|| {
        Rc::new(client.session().subscribe(move |user| {
            let mut identity = identity;
            let user = user.cloned();
            if *identity.peek() != user {
                identity.set(user);
            }
        }))
    });

    let restored = use_resource(move || {
        let client = client.clone();
        async move {
            if let Err(err) = client.restore().await {
                warn!(%err, "could not restore the saved session");
            }
        }
    });

    let settings = use_signal(|| AppSettings::load(&LocalStoragePreferences));
    use_context_provider(|| settings);
    use_effect(move || apply_theme(settings.read().theme));

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        if restored.read().is_some() {
            Router::<Route> {}
        }
    }
}

#[component]
fn Header() -> Element {
    let client = use_context::<BoardClientWeb>();
    let identity = use_context::<Identity>();
    let mut settings = use_context::<Signal<AppSettings>>();
    let navigator = use_navigator();

    let on_toggle_theme = move |_| {
        if let Err(err) = settings.write().toggle_theme(&LocalStoragePreferences) {
            warn!(%err, "failed to save theme");
        }
    };

    let on_logout = move |_| {
        client.sign_out();
        alert(messages::LOGGED_OUT);
        navigator.push(Route::BoardList {});
    };

    let theme_label = match settings.read().theme {
        Theme::Light => "다크 모드",
        Theme::Dark => "라이트 모드",
    };

    rsx! {
        header { class: "header",
            Link { to: Route::BoardList {}, class: "brand", "{messages::BOARD_TITLE}" }
            nav { class: "header-actions",
                button { class: "btn ghost", onclick: on_toggle_theme, "{theme_label}" }
                match identity.read().as_ref() {
                    Some(user) => rsx! {
                        span { class: "greeting", "{messages::welcome(user.label())}" }
                        button { class: "btn", onclick: on_logout, "로그아웃" }
                    },
                    None => rsx! {
                        Link { to: Route::Login {}, class: "btn", "로그인" }
                        Link { to: Route::Register {}, class: "btn ghost", "회원가입" }
                    },
                }
            }
        }
        main { class: "container", Outlet::<Route> {} }
    }
}

#[component]
fn BoardList() -> Element {
    let client = use_context::<BoardClientWeb>();
    let identity = use_context::<Identity>();
    let mut pager = use_signal(|| Paginator::new(POSTS_PER_PAGE));

    let posts = use_resource(move || {
        let client = client.clone();
        async move { client.list_posts().await }
    });

    // a shrinking list must not leave the current page past the end
    use_effect(move || {
        if let Some(Ok(list)) = &*posts.read() {
            pager.write().sync(list.len());
        }
    });

    let body = match &*posts.read() {
        None => rsx! { p { class: "status", "불러오는 중..." } },
        Some(Err(err)) => rsx! { p { class: "status error", "{err}" } },
        Some(Ok(list)) if list.is_empty() => {
            rsx! { p { class: "status", "{messages::EMPTY_BOARD}" } }
        }
        Some(Ok(list)) => {
            let current = *pager.read();
            let len = list.len();
            rsx! {
                table { class: "board",
                    thead {
                        tr {
                            th { "번호" }
                            th { "제목" }
                            th { "작성자" }
                            th { "작성일" }
                            th { "조회" }
                        }
                    }
                    tbody {
                        for row in current.rows(list) {
                            tr { key: "{row.item.id}",
                                td { "{row.number}" }
                                td {
                                    Link { to: Route::PostDetail { id: row.item.id.clone() }, "{row.item.title}" }
                                }
                                td { "{display_label(&row.item.username)}" }
                                td { "{short_date(&row.item.created_at)}" }
                                td { "{row.item.views}" }
                            }
                        }
                    }
                }
                nav { class: "pagination",
                    button {
                        disabled: !current.has_previous(),
                        onclick: move |_| {
                            let previous = pager.peek().current_page().saturating_sub(1);
                            pager.write().go_to(previous);
                        },
                        "이전"
                    }
                    for number in current.page_numbers(len) {
                        button {
                            key: "{number}",
                            class: if number == current.current_page() { "active" } else { "" },
                            onclick: move |_| pager.write().go_to(number),
                            "{number}"
                        }
                    }
                    button {
                        disabled: !current.has_next(len),
                        onclick: move |_| {
                            let next = pager.peek().current_page() + 1;
                            pager.write().go_to(next);
                        },
                        "다음"
                    }
                }
            }
        }
    };

    rsx! {
        section { class: "board-list",
            div { class: "board-head",
                h1 { "{messages::BOARD_TITLE}" }
                if identity.read().is_some() {
                    Link { to: Route::PostWrite {}, class: "btn", "글쓰기" }
                }
            }
            {body}
        }
    }
}

#[component]
fn PostDetail(id: String) -> Element {
    let client = use_context::<BoardClientWeb>();
    let identity = use_context::<Identity>();
    let navigator = use_navigator();

    let post = use_resource({
        let client = client.clone();
        let id = id.clone();
        move || {
            let client = client.clone();
            let id = id.clone();
            async move { open_post(&client, &id).await }
        }
    });

    let on_delete = move |post: Post| {
        let client = client.clone();
        let user = identity.read().clone();
        spawn(async move {
            match delete_post(&client, user.as_ref(), &post, || {
                confirm(messages::POST_DELETE_CONFIRM)
            })
            .await
            {
                Ok(true) => {
                    navigator.push(Route::BoardList {});
                }
                Ok(false) => {}
                Err(err) => {
                    warn!(post_id = %post.id, %err, "failed to delete post");
                    alert(messages::ACTION_FAILED);
                }
            }
        });
    };

    let view = match &*post.read() {
        None => rsx! { p { class: "status", "불러오는 중..." } },
        Some(Err(_)) => rsx! {
            p { class: "status error", "{messages::POST_NOT_FOUND}" }
            Link { to: Route::BoardList {}, class: "btn", "목록으로" }
        },
        Some(Ok(post)) => {
            let owned = is_owner(identity.read().as_ref(), Some(&post.user_id));
            let target = post.clone();
            rsx! {
                article { class: "post",
                    h1 { "{post.title}" }
                    div { class: "meta",
                        span { "{display_label(&post.username)}" }
                        span { "{short_date(&post.created_at)}" }
                        span { "조회 {post.views}" }
                    }
                    p { class: "content", "{post.content}" }
                    if owned {
                        div { class: "actions",
                            Link { to: Route::PostEdit { id: post.id.clone() }, class: "btn", "수정" }
                            button {
                                class: "btn danger",
                                onclick: move |_| on_delete(target.clone()),
                                "삭제"
                            }
                        }
                    }
                }
                CommentSection { post_id: post.id.clone() }
            }
        }
    };
    view
}

#[component]
fn CommentSection(post_id: String) -> Element {
    let client = use_context::<BoardClientWeb>();
    let identity = use_context::<Identity>();
    let mut thread = use_signal({
        let post_id = post_id.clone();
        move || CommentThread::new(post_id)
    });
    let mut draft = use_signal(String::new);
    let mut invalid = use_signal(|| None::<FieldError>);
    let mut submitting = use_signal(|| false);

    // only the most recent fetch may replace the list
    let reload = use_callback({
        let client = client.clone();
        move |_: ()| {
            let client = client.clone();
            let ticket = thread.write().begin_fetch();
            let post_id = thread.peek().post_id().to_string();
            spawn(async move {
                match client.list_comments(&post_id).await {
                    Ok(comments) => {
                        thread.write().finish_fetch(ticket, comments);
                    }
                    Err(err) => warn!(%post_id, %err, "failed to load comments"),
                }
            });
        }
    });

    use_effect(move || reload.call(()));

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if *submitting.peek() {
            return;
        }
        let content = draft.read().clone();
        if let Err(err) = validate_comment(&content) {
            invalid.set(Some(err));
            return;
        }
        invalid.set(None);
        submitting.set(true);
        let client = client.clone();
        let post_id = post_id.clone();
        let user = identity.read().clone();
        spawn(async move {
            match post_comment(&client, &post_id, user.as_ref(), &content).await {
                Ok(_) => {
                    draft.set(String::new());
                    reload.call(());
                }
                Err(_) => alert(messages::COMMENT_CREATE_FAILED),
            }
            submitting.set(false);
        });
    };

    let snapshot = thread.read().clone();
    let locked = !CommentThread::accepts_input(identity.read().as_ref(), *submitting.read());

    rsx! {
        section { class: "comments",
            h2 { "{snapshot.count_label()}" }
            form { class: "comment-form", onsubmit: on_submit,
                textarea {
                    placeholder: messages::COMMENT_PLACEHOLDER,
                    disabled: locked,
                    value: "{draft}",
                    oninput: move |evt| draft.set(evt.value()),
                }
                if let Some(err) = *invalid.read() {
                    p { class: "field-error", "{err.message}" }
                }
                button { class: "btn", r#type: "submit", disabled: locked, "등록" }
            }
            ul {
                for comment in snapshot.comments().iter().cloned() {
                    CommentItem {
                        key: "{comment.id}",
                        post_id: snapshot.post_id().to_string(),
                        comment,
                        on_deleted: reload,
                    }
                }
            }
        }
    }
}

#[component]
fn CommentItem(post_id: String, comment: Comment, on_deleted: EventHandler<()>) -> Element {
    let client = use_context::<BoardClientWeb>();
    let identity = use_context::<Identity>();
    let deletable = CommentThread::can_delete(identity.read().as_ref(), &comment);

    let on_delete = {
        let comment = comment.clone();
        move |_| {
            let client = client.clone();
            let comment = comment.clone();
            let post_id = post_id.clone();
            let user = identity.read().clone();
            spawn(async move {
                let outcome = remove_comment(&client, &post_id, user.as_ref(), &comment, || {
                    confirm(messages::COMMENT_DELETE_CONFIRM)
                })
                .await;
                match outcome {
                    Ok(DeleteOutcome::Deleted) => on_deleted.call(()),
                    Ok(DeleteOutcome::Cancelled) => {}
                    Err(_) => alert(messages::COMMENT_DELETE_FAILED),
                }
            });
        }
    };

    rsx! {
        li { class: "comment",
            div { class: "meta",
                span { class: "author", "{display_label(&comment.username)}" }
                span { "{short_date(&comment.created_at)}" }
                if deletable {
                    button { class: "btn small danger", onclick: on_delete, "삭제" }
                }
            }
            p { "{comment.content}" }
        }
    }
}

#[component]
fn PostForm(
    heading: String,
    initial: PostDraft,
    errors: Vec<FieldError>,
    on_save: EventHandler<PostDraft>,
) -> Element {
    let mut title = use_signal(|| initial.title.clone());
    let mut content = use_signal(|| initial.content.clone());

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        on_save.call(PostDraft {
            title: title.read().clone(),
            content: content.read().clone(),
        });
    };

    rsx! {
        form { class: "post-form", onsubmit: on_submit,
            h1 { "{heading}" }
            label { "제목" }
            input {
                r#type: "text",
                value: "{title}",
                oninput: move |evt| title.set(evt.value()),
            }
            if let Some(message) = message_for(&errors, "title") {
                p { class: "field-error", "{message}" }
            }
            label { "내용" }
            textarea {
                value: "{content}",
                oninput: move |evt| content.set(evt.value()),
            }
            if let Some(message) = message_for(&errors, "content") {
                p { class: "field-error", "{message}" }
            }
            button { class: "btn", r#type: "submit", "저장" }
        }
    }
}

#[component]
fn PostWrite() -> Element {
    let client = use_context::<BoardClientWeb>();
    let identity = use_context::<Identity>();
    let navigator = use_navigator();
    let mut errors = use_signal(Vec::<FieldError>::new);

    use_effect(move || {
        if identity.read().is_none() {
            navigator.replace(Route::Login {});
        }
    });

    let on_save = move |draft: PostDraft| {
        let client = client.clone();
        let user = identity.read().clone();
        spawn(async move {
            match publish_post(&client, user.as_ref(), &draft).await {
                Ok(post) => {
                    navigator.push(Route::PostDetail { id: post.id });
                }
                Err(SaveError::Invalid(fields)) => errors.set(fields),
                Err(SaveError::Remote(err)) => {
                    warn!(%err, "failed to publish post");
                    alert(messages::ACTION_FAILED);
                }
            }
        });
    };

    rsx! {
        PostForm {
            heading: "글쓰기".to_string(),
            initial: PostDraft::default(),
            errors: errors.read().clone(),
            on_save,
        }
    }
}

/// Nothing is rendered until ownership is settled; visitors who may not edit
/// are sent away before the form exists.
#[component]
fn PostEdit(id: String) -> Element {
    let client = use_context::<BoardClientWeb>();
    let identity = use_context::<Identity>();
    let navigator = use_navigator();

    let gate = use_resource(move || {
        let client = client.clone();
        let id = id.clone();
        let user = identity.read().clone();
        async move { load_edit_gate(&client, user.as_ref(), &id).await }
    });

    use_effect(move || match &*gate.read() {
        Some(Ok(EditGate::NotFound)) => {
            alert(messages::POST_NOT_FOUND);
            navigator.replace(Route::BoardList {});
        }
        Some(Ok(EditGate::Denied)) => navigator.go_back(),
        Some(Err(err)) => {
            warn!(%err, "failed to open editor");
            alert(messages::ACTION_FAILED);
            navigator.go_back();
        }
        _ => {}
    });

    let view = match &*gate.read() {
        Some(Ok(EditGate::Editable(post))) => rsx! { EditForm { post: post.clone() } },
        _ => rsx! {},
    };
    view
}

#[component]
fn EditForm(post: Post) -> Element {
    let client = use_context::<BoardClientWeb>();
    let identity = use_context::<Identity>();
    let navigator = use_navigator();
    let mut errors = use_signal(Vec::<FieldError>::new);
    let initial = PostDraft::from(&post);

    let on_save = move |draft: PostDraft| {
        let client = client.clone();
        let post = post.clone();
        let user = identity.read().clone();
        spawn(async move {
            match save_edit(&client, user.as_ref(), &post, &draft).await {
                Ok(updated) => {
                    alert(messages::POST_UPDATED);
                    navigator.push(Route::PostDetail { id: updated.id });
                }
                Err(SaveError::Invalid(fields)) => errors.set(fields),
                Err(SaveError::Remote(err)) => {
                    warn!(post_id = %post.id, %err, "failed to save post");
                    alert(messages::ACTION_FAILED);
                }
            }
        });
    };

    rsx! {
        PostForm {
            heading: "글 수정".to_string(),
            initial,
            errors: errors.read().clone(),
            on_save,
        }
    }
}

#[component]
fn Login() -> Element {
    let client = use_context::<BoardClientWeb>();
    let navigator = use_navigator();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut errors = use_signal(Vec::<FieldError>::new);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let email = email.read().trim().to_string();
        let password = password.read().clone();
        if let Err(fields) = validate_login(&email, &password) {
            errors.set(fields);
            return;
        }
        errors.set(Vec::new());
        let client = client.clone();
        spawn(async move {
            match client.sign_in(&email, &password).await {
                Ok(_) => {
                    navigator.push(Route::BoardList {});
                }
                Err(err) => {
                    warn!(%err, "sign-in failed");
                    alert(messages::LOGIN_FAILED);
                }
            }
        });
    };

    rsx! {
        form { class: "auth-form", onsubmit: on_submit,
            h1 { "로그인" }
            input {
                r#type: "email",
                placeholder: "이메일",
                value: "{email}",
                oninput: move |evt| email.set(evt.value()),
            }
            if let Some(message) = message_for(&errors.read(), "email") {
                p { class: "field-error", "{message}" }
            }
            input {
                r#type: "password",
                placeholder: "비밀번호",
                value: "{password}",
                oninput: move |evt| password.set(evt.value()),
            }
            if let Some(message) = message_for(&errors.read(), "password") {
                p { class: "field-error", "{message}" }
            }
            button { class: "btn", r#type: "submit", "로그인" }
            Link { to: Route::Register {}, "계정이 없으신가요? 회원가입" }
        }
    }
}

#[component]
fn Register() -> Element {
    let client = use_context::<BoardClientWeb>();
    let navigator = use_navigator();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut errors = use_signal(Vec::<FieldError>::new);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let email = email.read().trim().to_string();
        let password = password.read().clone();
        if let Err(fields) = validate_registration(&email, &password) {
            errors.set(fields);
            return;
        }
        errors.set(Vec::new());
        let client = client.clone();
        spawn(async move {
            match client.register(&email, &password).await {
                Ok(_) => {
                    navigator.push(Route::Login {});
                }
                Err(err) => {
                    warn!(%err, "registration failed");
                    alert(err.register_message());
                }
            }
        });
    };

    rsx! {
        form { class: "auth-form", onsubmit: on_submit,
            h1 { "회원가입" }
            input {
                r#type: "email",
                placeholder: "이메일",
                value: "{email}",
                oninput: move |evt| email.set(evt.value()),
            }
            if let Some(message) = message_for(&errors.read(), "email") {
                p { class: "field-error", "{message}" }
            }
            input {
                r#type: "password",
                placeholder: "비밀번호 (6자 이상)",
                value: "{password}",
                oninput: move |evt| password.set(evt.value()),
            }
            if let Some(message) = message_for(&errors.read(), "password") {
                p { class: "field-error", "{message}" }
            }
            button { class: "btn", r#type: "submit", "회원가입" }
            Link { to: Route::Login {}, "이미 계정이 있으신가요? 로그인" }
        }
    }
}
