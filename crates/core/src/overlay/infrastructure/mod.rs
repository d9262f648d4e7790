pub mod raster_overlay;
