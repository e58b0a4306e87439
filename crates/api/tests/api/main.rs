mod climate_routes;
mod home;
