use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::live_feed::{state_from_snapshot, LiveFeed, LiveMatch};
use crate::predictor::{
    validate_entry, EvaluateError, Evaluator, MatchState, PredictionResult, Timeline,
};
use crate::teams::{is_known_city, Team, CITIES};

pub struct AppState {
    pub evaluator: Evaluator,
    /// Absent when no API key is configured: manual entry only.
    pub feed: Option<Arc<dyn LiveFeed>>,
    /// Session-scoped timeline, mutated only by evaluations and reset.
    pub timeline: Mutex<Timeline>,
    /// Single-flight gate: a live poll tick is skipped while a feed-driven
    /// evaluation is still in flight, preserving timeline append order.
    pub live_gate: tokio::sync::Mutex<()>,
    pub poll_interval_secs: u64,
    pub default_target: i32,
}

impl AppState {
    /// A poisoned lock is recovered: the timeline holds no invariant a
    /// panicked writer could break mid-update.
    fn lock_timeline(&self) -> std::sync::MutexGuard<'_, Timeline> {
        self.timeline
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/cities", get(cities_handler))
        .route("/api/live-matches", get(live_matches_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/live-predict", post(live_predict_handler))
        .route("/api/timeline", get(timeline_handler))
        .route("/api/timeline/reset", post(reset_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Debug, Serialize)]
struct TeamInfo {
    name: &'static str,
    color: &'static str,
    logo: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: String,
    pub target: i32,
    pub score: i32,
    pub overs: f64,
    pub wickets: i32,
}

#[derive(Debug, Deserialize)]
pub struct LivePredictRequest {
    pub match_id: String,
    /// The feed does not report venues; the user picks the host city.
    pub city: String,
}

/// Serve the dashboard HTML page, injecting the auto-refresh interval.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let html = DASHBOARD_HTML.replace(
        r#"<body>"#,
        &format!(r#"<body data-poll="{}">"#, state.poll_interval_secs),
    );
    Html(html)
}

/// GET /api/teams
async fn teams_handler() -> impl IntoResponse {
    let teams: Vec<TeamInfo> = Team::ALL
        .iter()
        .map(|t| TeamInfo {
            name: t.name(),
            color: t.color(),
            logo: t.logo_url(),
        })
        .collect();
    Json(teams)
}

/// GET /api/cities
async fn cities_handler() -> impl IntoResponse {
    Json(CITIES)
}

/// GET /api/live-matches
///
/// Feed failures degrade to an empty list: the page treats that as "live
/// mode unavailable" and stays in manual entry. The typed error is logged.
async fn live_matches_handler(State(state): State<Arc<AppState>>) -> Json<Vec<LiveMatch>> {
    let feed = match &state.feed {
        Some(f) => f,
        None => return Json(vec![]),
    };
    match feed.list_live_matches().await {
        Ok(matches) => Json(matches),
        Err(e) => {
            warn!("Live feed '{}' failed: {}", feed.name(), e);
            Json(vec![])
        }
    }
}

/// POST /api/predict — manual-entry evaluation.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictionResult>, (StatusCode, String)> {
    let match_state = MatchState {
        batting_team: req.batting_team,
        bowling_team: req.bowling_team,
        city: req.city,
        target: req.target,
        score: req.score,
        overs_completed: req.overs,
        wickets_lost: req.wickets,
    };
    validate_entry(&match_state)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let mut timeline = state.lock_timeline();
    state
        .evaluator
        .evaluate(&match_state, &mut timeline)
        .map(Json)
        .map_err(evaluate_error_response)
}

/// POST /api/live-predict — feed-driven evaluation with defaults for
/// missing fields.
async fn live_predict_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LivePredictRequest>,
) -> Result<Json<PredictionResult>, (StatusCode, String)> {
    let _gate = state.live_gate.try_lock().map_err(|_| {
        (
            StatusCode::TOO_MANY_REQUESTS,
            "previous live evaluation still in flight".to_string(),
        )
    })?;
    let feed = state.feed.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "live mode unavailable: no feed configured".to_string(),
    ))?;
    if !is_known_city(&req.city) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("unknown host city: {}", req.city),
        ));
    }

    let snapshot = match feed.fetch_score(&req.match_id).await {
        Ok(s) => s,
        Err(e) => {
            warn!("Live feed '{}' failed: {}", feed.name(), e);
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                "live feed unavailable".to_string(),
            ));
        }
    };

    let match_state = state_from_snapshot(&snapshot, &req.city, state.default_target);
    let mut timeline = state.lock_timeline();
    state
        .evaluator
        .evaluate(&match_state, &mut timeline)
        .map(Json)
        .map_err(evaluate_error_response)
}

/// GET /api/timeline
async fn timeline_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timeline = state.lock_timeline();
    Json(timeline.all().to_vec())
}

/// POST /api/timeline/reset
async fn reset_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.lock_timeline().clear();
    StatusCode::NO_CONTENT
}

fn evaluate_error_response(err: EvaluateError) -> (StatusCode, String) {
    match err {
        // Expected, user-correctable advisory
        EvaluateError::Rejected(r) => (StatusCode::UNPROCESSABLE_ENTITY, r.to_string()),
        EvaluateError::Model(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>CricWin — Chase Win Probability</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #ff4b4b;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; color: var(--accent); }
  .badge { padding: .2rem .6rem; border-radius: 4px; font-size: .75rem; font-weight: 700; text-transform: uppercase; }
  .badge.manual { background: #ff9800; color: #000; }
  .badge.live { background: var(--green); color: #000; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; }
  .panel-header { padding: .9rem 1.2rem; border-bottom: 1px solid var(--border); font-weight: 600; display: flex; justify-content: space-between; align-items: center; }
  .panel-body { padding: 1.2rem; }
  .form-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 1rem; }
  label { display: block; color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; margin-bottom: .3rem; }
  select, input[type=number] { width: 100%; background: var(--bg); border: 1px solid var(--border); color: var(--text); padding: .5rem .6rem; border-radius: 6px; font-size: .9rem; }
  .btn { background: var(--accent); border: none; color: #fff; padding: .55rem 1.4rem; border-radius: 6px; cursor: pointer; font-size: .9rem; font-weight: 600; }
  .btn.secondary { background: none; border: 1px solid var(--border); color: var(--muted); }
  .btn.secondary:hover { border-color: var(--accent); color: var(--accent); }
  .toggle-row { display: flex; align-items: center; gap: .6rem; }
  .advisory { display: none; padding: .7rem 1rem; border-radius: 8px; background: rgba(255,152,0,.12); color: #ff9800; font-size: .9rem; }
  .two-col { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
  @media (max-width: 768px) { .two-col { grid-template-columns: 1fr; } }
  .team-box { text-align: center; padding: 1rem; }
  .team-box img { width: 84px; height: 84px; object-fit: contain; }
  .team-box h3 { margin: .5rem 0; }
  .bar { background: var(--bg); border: 1px solid var(--border); border-radius: 20px; height: 16px; overflow: hidden; }
  .bar > div { height: 100%; border-radius: 20px; transition: width .4s; }
  .pct { margin-top: .4rem; font-size: 1.3rem; font-weight: 700; }
  .situation { color: var(--muted); font-size: .9rem; line-height: 1.7; }
  .situation b { color: var(--text); }
  .commentary { margin-top: .8rem; padding: .7rem 1rem; border-radius: 8px; background: rgba(108,99,255,.12); font-size: .9rem; }
  #chart-container { padding: 1rem; height: 220px; position: relative; }
  canvas { width: 100% !important; }
  .empty { color: var(--muted); text-align: center; padding: 2rem; font-size: .9rem; }
</style>
</head>
<body>
<header>
  <h1>🏏 CricWin</h1>
  <span>Chase Win Probability — Live Match Analysis</span>
  <span class="badge manual" id="mode-badge" style="margin-left:auto;">Manual</span>
</header>

<main>
  <div class="panel">
    <div class="panel-header">
      Match State
      <div class="toggle-row">
        <input type="checkbox" id="live-toggle">
        <label for="live-toggle" style="margin:0;">Live Mode</label>
      </div>
    </div>
    <div class="panel-body">
      <div id="live-row" class="form-grid" style="display:none;margin-bottom:1rem;">
        <div style="grid-column: 1 / -1;">
          <label for="live-match">Live Match</label>
          <select id="live-match"></select>
        </div>
      </div>
      <div class="form-grid" id="manual-grid">
        <div><label for="batting">Batting Team</label><select id="batting"></select></div>
        <div><label for="bowling">Bowling Team</label><select id="bowling"></select></div>
        <div><label for="city">Host City</label><select id="city"></select></div>
        <div><label for="target">Target Score</label><input type="number" id="target" min="1" step="1" value="150"></div>
        <div><label for="score">Score</label><input type="number" id="score" min="0" step="1" value="0"></div>
        <div><label for="overs">Overs</label><input type="number" id="overs" min="0" max="20" step="0.1" value="0.0"></div>
        <div><label for="wickets">Wickets</label><input type="number" id="wickets" min="0" max="10" step="1" value="0"></div>
      </div>
      <div style="margin-top:1rem;display:flex;gap:.8rem;align-items:center;">
        <button class="btn" id="predict-btn">Predict</button>
        <button class="btn secondary" id="reset-btn">🔄 Reset Timeline</button>
        <div class="advisory" id="advisory"></div>
      </div>
    </div>
  </div>

  <div class="panel" id="result-panel" style="display:none;">
    <div class="panel-header">Prediction</div>
    <div class="panel-body">
      <div class="two-col">
        <div class="team-box">
          <img id="bat-logo" alt="">
          <h3 id="bat-name"></h3>
          <div class="bar"><div id="bat-bar"></div></div>
          <div class="pct" id="bat-pct" style="color:var(--green);"></div>
        </div>
        <div class="team-box">
          <img id="bowl-logo" alt="">
          <h3 id="bowl-name"></h3>
          <div class="bar"><div id="bowl-bar"></div></div>
          <div class="pct" id="bowl-pct" style="color:var(--red);"></div>
        </div>
      </div>
      <div class="situation" id="situation"></div>
      <div class="commentary" id="commentary"></div>
    </div>
  </div>

  <div class="panel">
    <div class="panel-header">📈 Win Probability Timeline</div>
    <div id="chart-container"><canvas id="timeline-chart"></canvas></div>
    <div class="empty" id="timeline-empty">No predictions yet</div>
  </div>
</main>

<script>
let teams = [];
let liveTimer = null;
let pollInFlight = false;

const el = id => document.getElementById(id);
const COMMENTARY_TEXT = {
  rrr_under_control: '✅ RRR under control.',
  rrr_above_crr: '⚠️ RRR above CRR.',
  wickets_in_hand_comfortable: '💪 Wickets in hand.',
  wickets_low: '🛑 Low wickets left.',
  endgame: '🔥 Endgame: every ball counts.'
};

async function loadSelectors() {
  const [tr, cr] = await Promise.all([fetch('/api/teams'), fetch('/api/cities')]);
  teams = await tr.json();
  const cities = await cr.json();
  for (const sel of ['batting', 'bowling']) {
    el(sel).innerHTML = teams.map(t => `<option>${t.name}</option>`).join('');
  }
  el('bowling').selectedIndex = 1;
  el('city').innerHTML = cities.map(c => `<option>${c}</option>`).join('');
}

function teamInfo(name) {
  return teams.find(t => t.name === name) || { color: '#6c63ff', logo: '' };
}

function advisory(msg) {
  const a = el('advisory');
  a.textContent = msg || '';
  a.style.display = msg ? 'block' : 'none';
}

function renderResult(r) {
  const s = r.state;
  const bat = teamInfo(s.batting_team), bowl = teamInfo(s.bowling_team);
  el('bat-logo').src = bat.logo; el('bowl-logo').src = bowl.logo;
  el('bat-name').textContent = s.batting_team; el('bat-name').style.color = bat.color;
  el('bowl-name').textContent = s.bowling_team; el('bowl-name').style.color = bowl.color;
  el('bat-bar').style.width = (r.win_prob * 100).toFixed(1) + '%';
  el('bat-bar').style.background = bat.color;
  el('bowl-bar').style.width = (r.loss_prob * 100).toFixed(1) + '%';
  el('bowl-bar').style.background = bowl.color;
  el('bat-pct').textContent = (r.win_prob * 100).toFixed(1) + '%';
  el('bowl-pct').textContent = (r.loss_prob * 100).toFixed(1) + '%';
  el('situation').innerHTML =
    `<b>Batting:</b> ${s.batting_team} | <b>Bowling:</b> ${s.bowling_team} | <b>City:</b> ${s.city}<br>` +
    `<b>Target:</b> ${s.target} | <b>Score:</b> ${s.score}/${s.wickets_lost} in ${s.overs_completed} overs<br>` +
    `<b>Runs Left:</b> ${r.runs_left} | <b>Balls Left:</b> ${r.balls_left}<br>` +
    `<b>CRR:</b> ${r.crr.toFixed(2)} | <b>RRR:</b> ${r.rrr.toFixed(2)}`;
  el('commentary').textContent = r.commentary.map(t => COMMENTARY_TEXT[t] || t).join(' ');
  el('result-panel').style.display = 'block';
}

async function predict() {
  advisory('');
  const live = el('live-toggle').checked;
  const url = live ? '/api/live-predict' : '/api/predict';
  const body = live
    ? { match_id: el('live-match').value, city: el('city').value }
    : {
        batting_team: el('batting').value,
        bowling_team: el('bowling').value,
        city: el('city').value,
        target: Number(el('target').value),
        score: Number(el('score').value),
        overs: Number(el('overs').value),
        wickets: Number(el('wickets').value)
      };
  const r = await fetch(url, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body)
  });
  if (!r.ok) { advisory(await r.text()); return; }
  renderResult(await r.json());
  await loadTimeline();
}

async function loadTimeline() {
  const r = await fetch('/api/timeline');
  if (!r.ok) return;
  const entries = await r.json();
  el('timeline-empty').style.display = entries.length ? 'none' : 'block';
  drawChart(entries.map(e => e.overs), entries.map(e => e.win_pct));
}

function drawChart(labels, data) {
  const canvas = el('timeline-chart');
  const ctx = canvas.getContext('2d');
  const W = canvas.parentElement.clientWidth - 32;
  const H = 180;
  canvas.width = W;
  canvas.height = H;
  ctx.clearRect(0, 0, W, H);
  if (!data.length) return;

  // Fixed 0–100% scale
  const toY = v => H - (v / 100) * H;
  ctx.strokeStyle = '#2a2d3a';
  ctx.lineWidth = 1;
  for (let i = 0; i <= 4; i++) {
    const y = H - (i / 4) * H;
    ctx.beginPath(); ctx.moveTo(0, y); ctx.lineTo(W, y); ctx.stroke();
  }

  const color = teamInfo(el('batting').value).color;
  const step = data.length > 1 ? W / (data.length - 1) : 0;
  ctx.strokeStyle = color;
  ctx.lineWidth = 2;
  ctx.beginPath();
  data.forEach((v, i) => i === 0 ? ctx.moveTo(0, toY(v)) : ctx.lineTo(i * step, toY(v)));
  ctx.stroke();
  ctx.fillStyle = color;
  data.forEach((v, i) => {
    ctx.beginPath();
    ctx.arc(i * step, toY(v), 3.5, 0, Math.PI * 2);
    ctx.fill();
  });
}

async function toggleLive() {
  const on = el('live-toggle').checked;
  const badge = el('mode-badge');
  if (on) {
    const r = await fetch('/api/live-matches');
    const matches = r.ok ? await r.json() : [];
    if (!matches.length) {
      advisory('No live matches right now.');
      el('live-toggle').checked = false;
      return;
    }
    el('live-match').innerHTML = matches.map(m => `<option value="${m.id}">${m.title}</option>`).join('');
    el('live-row').style.display = 'grid';
    badge.textContent = 'Live'; badge.className = 'badge live';
    const pollSecs = Number(document.body.dataset.poll) || 30;
    liveTimer = setInterval(async () => {
      if (pollInFlight) return; // skip a tick if the previous one is slow
      pollInFlight = true;
      try { await predict(); } finally { pollInFlight = false; }
    }, pollSecs * 1000);
  } else {
    clearInterval(liveTimer);
    liveTimer = null;
    el('live-row').style.display = 'none';
    badge.textContent = 'Manual'; badge.className = 'badge manual';
  }
}

async function resetTimeline() {
  await fetch('/api/timeline/reset', { method: 'POST' });
  await loadTimeline();
}

el('predict-btn').addEventListener('click', predict);
el('reset-btn').addEventListener('click', resetTimeline);
el('live-toggle').addEventListener('change', toggleLive);

loadSelectors().then(loadTimeline);
</script>
</body>
</html>"#;
