pub mod sendgrid_driveshare;
