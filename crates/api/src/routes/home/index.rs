use std::sync::Arc;

use axum::extract::State;

use crate::AppState;

/// Plain-text listing of the available routes (GET /)
pub async fn index_handler(State(state): State<Arc<AppState>>) -> String {
    format!(
        "Climate observations for {}\n\
         \n\
         Available Routes:\n\
         /api/v1.0/precipitation\n\
         /api/v1.0/stations\n\
         /api/v1.0/tobs\n\
         /api/v1.0/<start_date>*\n\
         /api/v1.0/<start_date>/<end_date>*\n\
         \n\
         *dates format should be yyyy-mm-dd\n\
         \n\
         API reference: /docs\n",
        state.climate.region()
    )
}
