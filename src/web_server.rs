use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    serve, Router,
};
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::chat::ChatMessage;
use crate::llm_interaction::LlmClient;
use crate::orders::Order;
use crate::session::Session;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Frames sent by the browser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    UserMessage { content: String },
}

/// Frames sent to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    Info { message: String },
    Reply { content: String },
    Orders { orders: Vec<Order> },
    Error { message: String },
}

impl ServerEvent {
    fn orders(session: &Session) -> Self {
        ServerEvent::Orders { orders: session.orders.iter().cloned().collect() }
    }
}

// Shared application state. Sessions are not in here: each socket owns its own.
#[derive(Clone)]
pub struct AppState {
    templates: Arc<Environment<'static>>,
    llm: LlmClient,
}

impl AppState {
    pub fn new(llm: LlmClient) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)
            .context("Failed to load index template")?;
        Ok(Self { templates: Arc::new(env), llm })
    }
}

#[derive(Serialize)]
struct OrderRow<'a> {
    order_id: &'a str,
    status: String,
    total: String,
}

fn render_index(templates: &Environment<'static>, session: &Session) -> Result<String, minijinja::Error> {
    let messages: Vec<&ChatMessage> = session.conversation.visible().collect();
    let orders: Vec<OrderRow> = session
        .orders
        .iter()
        .map(|o| OrderRow {
            order_id: &o.order_id,
            status: o.status.to_string(),
            total: format!("{:.2}", o.total),
        })
        .collect();

    let tmpl = templates.get_template("index.html")?;
    tmpl.render(minijinja::context! {
        title => "Customer Support Agent",
        messages => messages,
        orders => orders,
    })
}

// The page shows what a new session starts with; the socket takes it from there.
async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, Html<String>)> {
    render_index(&state.templates, &Session::new())
        .map(Html)
        .map_err(|e| {
            error!("Failed to render index template: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("Internal Server Error: {}", e)))
        })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket connection upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<()> {
    let json = serde_json::to_string(event).context("Failed to serialize server event")?;
    socket
        .send(Message::Text(json))
        .await
        .context("Failed to send WebSocket frame")
}

/// Turns one text frame from the client into the frames to send back.
pub async fn handle_client_text(session: &mut Session, llm: &LlmClient, text: &str) -> Vec<ServerEvent> {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(session = %session.id, error = %e, "Unrecognised client frame");
            return vec![ServerEvent::Error { message: "Unrecognised message.".to_string() }];
        }
    };

    match event {
        ClientEvent::UserMessage { content } => {
            let content = content.trim();
            if content.is_empty() {
                return Vec::new();
            }
            match session.handle_turn(llm, content).await {
                Ok(reply) => vec![ServerEvent::Reply { content: reply }, ServerEvent::orders(session)],
                Err(e) => {
                    error!(session = %session.id, "Turn failed: {:?}", e);
                    vec![ServerEvent::Error {
                        message: "Sorry, the assistant is unavailable right now. Please try again.".to_string(),
                    }]
                }
            }
        }
    }
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut session = Session::new();
    info!(session = %session.id, "Session started");

    let welcome = [
        ServerEvent::Info { message: format!("Connected to order desk ({})", state.llm.model()) },
        ServerEvent::orders(&session),
    ];
    for event in &welcome {
        if let Err(e) = send_event(&mut socket, event).await {
            warn!(session = %session.id, "Failed to send welcome: {:?}", e);
            return;
        }
    }

    while let Some(frame) = socket.recv().await {
        match frame {
            Ok(Message::Text(text)) => {
                for event in handle_client_text(&mut session, &state.llm, &text).await {
                    if let Err(e) = send_event(&mut socket, &event).await {
                        warn!(session = %session.id, "Client went away: {:?}", e);
                        return;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!(session = %session.id, "Client requested WebSocket close");
                break;
            }
            Ok(Message::Binary(_)) => warn!(session = %session.id, "Ignoring binary frame"),
            // Axum answers pings itself
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                warn!(session = %session.id, "WebSocket error: {}", e);
                break;
            }
        }
    }
    info!(session = %session.id, orders = session.orders.len(), "Session ended");
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(port: u16, llm: LlmClient) -> Result<()> {
    let state = AppState::new(llm)?;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
