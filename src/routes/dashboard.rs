//! Dashboard UI: a single inline HTML page served at `/`.
//!
//! The page fetches `/api/last` for the 72-hour chart and `/api/predict` on
//! demand, with a toggle between raw µg/m³ readings and mapped AQI scores.
//! Category colors use the same CSS classes the AQI mapper emits.

use axum::{response::Html, routing::get, Router};

// ---

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(dashboard))
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

const DASHBOARD_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>PM2.5 Air-Quality Forecast</title>
<style>
:root { --bg:#0b1117; --card:#111827; --muted:#9ca3af; --accent:#2563eb; --text:#e6edf3; }
body{font-family:system-ui,Segoe UI,Roboto,Arial; margin:24px; background:var(--bg); color:var(--text)}
.wrapper{max-width:1024px; margin:auto}
.card{background:var(--card); padding:20px; border-radius:16px; box-shadow:0 6px 24px rgba(0,0,0,.25); margin-bottom:16px}
h1{margin:0 0 12px; font-size:28px}
.tag{display:inline-block; padding:4px 10px; border-radius:999px; background:#1f2937; color:var(--muted); font-size:12px}
.row{display:flex; gap:16px; align-items:center; justify-content:space-between; flex-wrap:wrap}
.btn{background:var(--accent); color:#fff; padding:10px 14px; border:none; border-radius:10px; cursor:pointer}
.btn:disabled{opacity:.6; cursor:default}
select{background:#0f172a; color:#e2e8f0; border:1px solid #1f2937; border-radius:10px; padding:8px 10px}
canvas{width:100%; height:360px; background:#0b1220; border-radius:12px}
.small{color:#9ca3af; font-size:13px; line-height:1.6}
.kbd{background:#1f2937; padding:2px 6px; border-radius:6px; font-size:12px; color:#cbd5e1}
.footer{margin-top:8px; color:#9ca3af; font-size:12px; text-align:center}
.stat{display:inline-block; padding:6px 10px; border-radius:10px; margin-top:8px; font-weight:600}
.aqi-good{background:#052e11; color:#7aff8a}
.aqi-moderate{background:#2a2a05; color:#fff68a}
.aqi-usg{background:#3a2205; color:#ffce8a}
.aqi-unhealthy{background:#3a0b0b; color:#ff9c9c}
.aqi-very{background:#2a0623; color:#ff9bf0}
.aqi-hazardous{background:#2a0008; color:#ff99b2}
.aqi-unknown{background:#1f2937; color:#9ca3af}
.section-title{margin:6px 0 8px; font-size:18px}
ul {margin-top:4px}
</style>
</head>
<body>
<div class="wrapper">
  <div class="card">
    <div class="row">
      <div>
        <h1>PM2.5 Air-Quality Forecast</h1>
        <div class="tag">experimental &bull; hour-by-hour &bull; units: &micro;g/m&sup3; or AQI</div>
      </div>
      <div class="row" style="gap:8px">
        <label class="small">Display:</label>
        <select id="modeSel">
          <option value="ugm3">&micro;g/m&sup3; (PM2.5)</option>
          <option value="aqi">AQI (air quality index)</option>
        </select>
        <button id="predictBtn" class="btn">Predict next hour</button>
      </div>
    </div>

    <p class="small" style="margin:10px 0 0">
      <strong>How it works:</strong> historical <span class="kbd">PM2.5</span> readings are aligned to an
      hourly grid and turned into time features (lags and rolling statistics) for a model that predicts
      the next hour. The result can be shown in &micro;g/m&sup3; or as an <span class="kbd">AQI</span> score.
    </p>
    <p class="small" style="margin:6px 0 0">
      <strong>Reading the chart:</strong> the line shows the last 72 hours. Pick the display mode from the
      dropdown. Pressing <em>Predict next hour</em> shows the number and its color-coded health category.
    </p>

    <div id="predBox"></div>
  </div>

  <div class="card">
    <h2 class="section-title">Time series (last 72 hours)</h2>
    <canvas id="chart"></canvas>
    <div class="footer">aircast</div>
  </div>

  <div class="card">
    <h2 class="section-title">Notes</h2>
    <ul class="small">
      <li>The AQI shown here is an instantaneous approximation for display. Official indexes use longer aggregations (e.g. 24&nbsp;h / NowCast).</li>
      <li>The health category is a simplified guide, not a replacement for official indicators.</li>
    </ul>
  </div>
</div>

<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
<script>
const predBox = document.getElementById('predBox');
const btn = document.getElementById('predictBtn');
const sel = document.getElementById('modeSel');
let cache = { timestamps: [], pm25: [], aqi: [] };
let chart;

function aqiClass(aqi){
  if (aqi <= 50) return {cls:'aqi-good', text:'good'};
  if (aqi <= 100) return {cls:'aqi-moderate', text:'moderate'};
  if (aqi <= 150) return {cls:'aqi-usg', text:'unhealthy for sensitive groups'};
  if (aqi <= 200) return {cls:'aqi-unhealthy', text:'unhealthy'};
  if (aqi <= 300) return {cls:'aqi-very', text:'very unhealthy'};
  return {cls:'aqi-hazardous', text:'hazardous'};
}
function yTitle(){ return sel.value === 'aqi' ? 'AQI' : 'PM2.5 (µg/m³)'; }

async function loadLast(){
  const res = await fetch('/api/last');
  cache = await res.json();
  const ctx = document.getElementById('chart').getContext('2d');
  const dataSeries = sel.value === 'aqi' ? cache.aqi : cache.pm25;
  chart = new Chart(ctx, {
    type: 'line',
    data: { labels: cache.timestamps, datasets: [{ data: dataSeries, label: sel.value === 'aqi' ? 'AQI' : 'PM2.5', fill:false, tension:0.2, pointRadius:2 }] },
    options: { responsive:true, plugins: { legend: { labels: { usePointStyle:true } },
                 tooltip: { callbacks: { label: (c) => (sel.value==='aqi' ? 'AQI: ' : 'PM2.5: ') + c.parsed.y + (sel.value==='aqi' ? '' : ' µg/m³') } } },
               scales:{ x:{ display:false }, y:{ title:{ display:true, text:yTitle() } } } }
  });
}
function refreshChart(){
  if(!chart) return;
  const ser = sel.value === 'aqi' ? cache.aqi : cache.pm25;
  chart.data.datasets[0].data = ser;
  chart.data.datasets[0].label = sel.value === 'aqi' ? 'AQI' : 'PM2.5';
  chart.options.scales.y.title.text = yTitle();
  chart.update();
}
async function predict(){
  btn.disabled = true;
  try{
    const res = await fetch('/api/predict');
    if(!res.ok) throw new Error('predict failed');
    const j = await res.json();
    const showAqi = sel.value === 'aqi';
    const value = showAqi ? j.next_hour_prediction_aqi : j.next_hour_prediction_ugm3;
    const cat   = aqiClass(j.next_hour_prediction_aqi);
    predBox.innerHTML = `
      <div class="stat ${cat.cls}">
        ${showAqi ? 'AQI' : 'PM2.5'} (next hour):
        <span style="font-weight:800">${value}</span>${showAqi ? '' : ' µg/m³'} — ${cat.text}
      </div>
      <div class="small">Last available reading: ${j.last_timestamp}</div>
    `;
  }catch(e){
    predBox.innerHTML = '<div class="small">Could not get a prediction.</div>';
  }finally{ btn.disabled = false; }
}
sel.addEventListener('change', refreshChart);
btn.addEventListener('click', predict);
loadLast();
</script>
</body>
</html>
"#;
